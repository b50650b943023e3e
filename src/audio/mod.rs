//! Playback driver — an owned cpal stream fed through a lock-free queue.
//!
//! [`AudioEngine`] is the only handle to the output stream. The UI thread
//! sends [`AudioCommand`]s whenever the series or volume changes; the audio
//! thread renders an additive oscillator bank from them. Dropping the engine
//! stops the stream and releases the device.

pub mod bank;
pub mod callback;
pub mod command;
pub mod limiter;
pub mod params;
pub mod wav;

use std::fmt;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapProd, HeapRb};

use crate::harmonic::HarmonicSeries;

pub use bank::{OscillatorBank, Partial};
pub use command::AudioCommand;
pub use limiter::Limiter;
pub use params::{
    calculate_volume, normalization_factor, HarmonicParams, PeriodicWave,
    DEFAULT_BASE_FREQUENCY,
};
pub use wav::{render_series, write_wav, WavFormat};

use callback::AudioCallback;

/// Pending series/gain updates the audio thread may lag behind by.
const COMMAND_QUEUE_LEN: usize = 64;

#[derive(Debug)]
pub enum AudioError {
    /// The host reports no output device.
    NoDevice,
    /// The device would not describe its output format.
    Format(String),
    /// The device refused the requested stream.
    Open(String),
    /// Starting or pausing the stream failed.
    Transport(String),
    /// The audio thread has stopped draining updates.
    QueueFull,
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoDevice => f.write_str("no output device available"),
            AudioError::Format(e) => write!(f, "cannot read output format: {e}"),
            AudioError::Open(e) => write!(f, "cannot open output stream: {e}"),
            AudioError::Transport(e) => write!(f, "stream transport failed: {e}"),
            AudioError::QueueFull => f.write_str("audio thread is not keeping up"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Owned playback handle: the running stream plus the sending half of the
/// update queue.
pub struct AudioEngine {
    stream: cpal::Stream,
    updates: HeapProd<AudioCommand>,
    sample_rate: u32,
    channels: u16,
    device_name: String,
    base_frequency: f64,
}

impl AudioEngine {
    /// Open the default output device in its preferred format.
    pub fn new() -> Result<Self, AudioError> {
        Self::open(None)
    }

    /// Open the default output device at an explicit rate and channel count.
    pub fn with_config(sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        Self::open(Some((sample_rate, channels)))
    }

    fn open(format: Option<(u32, u16)>) -> Result<Self, AudioError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let (sample_rate, channels) = match format {
            Some(format) => format,
            None => {
                let preferred = device
                    .default_output_config()
                    .map_err(|e| AudioError::Format(e.to_string()))?;
                (preferred.sample_rate().0, preferred.channels())
            }
        };

        let (updates, pending) = HeapRb::<AudioCommand>::new(COMMAND_QUEUE_LEN).split();
        let mut renderer = AudioCallback::new(pending, channels, sample_rate);

        let stream = device
            .build_output_stream(
                &cpal::StreamConfig {
                    channels,
                    sample_rate: cpal::SampleRate(sample_rate),
                    buffer_size: cpal::BufferSize::Default,
                },
                move |out: &mut [f32], _: &cpal::OutputCallbackInfo| renderer.process(out),
                |err| log::error!("output stream: {err}"),
                None,
            )
            .map_err(|e| AudioError::Open(e.to_string()))?;
        stream
            .play()
            .map_err(|e| AudioError::Transport(e.to_string()))?;

        let device_name = device.name().unwrap_or_else(|_| "unnamed device".into());
        log::info!("opened {device_name} at {sample_rate} Hz, {channels} ch");

        Ok(Self {
            stream,
            updates,
            sample_rate,
            channels,
            device_name,
            base_frequency: DEFAULT_BASE_FREQUENCY,
        })
    }

    /// Set the fundamental frequency used by subsequent [`apply`](Self::apply) calls.
    pub fn set_base_frequency(&mut self, base_frequency: f64) {
        self.base_frequency = base_frequency;
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    /// Push a series and its normalization factor to the audio thread.
    ///
    /// `volume` is typically [`normalization_factor`] of the waveform's
    /// mean absolute level; it is capped by [`calculate_volume`].
    pub fn apply(&mut self, series: &HarmonicSeries, volume: f64) -> Result<(), AudioError> {
        let partials = Partial::from_series(series, self.base_frequency);
        self.send(AudioCommand::SetPartials(partials))?;
        self.set_gain(calculate_volume(volume) as f32)
    }

    /// Set the master gain directly (0.0..=1.0).
    pub fn set_gain(&mut self, gain: f32) -> Result<(), AudioError> {
        self.send(AudioCommand::SetGain(gain))
    }

    /// Mute output. The next [`apply`](Self::apply) unmutes.
    pub fn silence(&mut self) -> Result<(), AudioError> {
        self.send(AudioCommand::Silence)
    }

    fn send(&mut self, command: AudioCommand) -> Result<(), AudioError> {
        push_command(&mut self.updates, command)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Suspend the stream without closing the device.
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::Transport(e.to_string()))
    }

    /// Resume a paused stream.
    pub fn play(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::Transport(e.to_string()))
    }
}

/// Queue `command` for the audio thread without blocking.
fn push_command(
    updates: &mut HeapProd<AudioCommand>,
    command: AudioCommand,
) -> Result<(), AudioError> {
    updates.try_push(command).map_err(|_| AudioError::QueueFull)
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        log::debug!("releasing {}", self.device_name);
    }
}
