//! Audio callback — runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer, renders the oscillator bank into
//! the interleaved output, applies master gain and the limiter.

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::bank::OscillatorBank;
use super::command::AudioCommand;
use super::limiter::Limiter;

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    bank: OscillatorBank,
    gain: f32,
    muted: bool,
    limiter: Limiter,
    channels: u16,
}

impl AudioCallback {
    pub fn new(consumer: HeapCons<AudioCommand>, channels: u16, sample_rate: u32) -> Self {
        Self {
            consumer,
            bank: OscillatorBank::new(sample_rate),
            gain: 0.0,
            muted: true,
            limiter: Limiter::default(),
            channels,
        }
    }

    /// Called by cpal for each output buffer.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::SetPartials(partials) => {
                    self.bank.set_partials(partials);
                    self.muted = false;
                }
                AudioCommand::SetGain(g) => {
                    self.gain = g.clamp(0.0, 1.0);
                }
                AudioCommand::Silence => {
                    self.muted = true;
                }
            }
        }

        if self.muted || self.bank.is_silent() {
            output.fill(0.0);
            return;
        }

        self.bank.render(output, self.channels, self.gain);
        self.limiter.limit_block(output);
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
