//! Additive oscillator bank — one sine per audible harmonic.

use std::f64::consts::TAU;

use crate::harmonic::HarmonicSeries;

use super::params::HarmonicParams;

/// One running sine partial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub frequency: f64,
    pub amplitude: f64,
    /// Phase offset in radians.
    pub phase_offset: f64,
}

impl Partial {
    /// Partials for every audible harmonic of `series`.
    pub fn from_series(series: &HarmonicSeries, base_frequency: f64) -> Vec<Partial> {
        series
            .audible()
            .map(|h| Partial {
                frequency: HarmonicParams::new(h, base_frequency).frequency,
                amplitude: h.amplify,
                phase_offset: h.phase(),
            })
            .collect()
    }
}

/// Sums its partials sample by sample, matching the synthesized cycle:
/// `amplitude * sin(2π f t + phase_offset)`.
#[derive(Debug, Clone)]
pub struct OscillatorBank {
    partials: Vec<Partial>,
    /// Running phase per partial, in cycles `[0, 1)`.
    phases: Vec<f64>,
    sample_rate: u32,
}

impl OscillatorBank {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            partials: Vec::new(),
            phases: Vec::new(),
            sample_rate,
        }
    }

    pub fn from_series(series: &HarmonicSeries, base_frequency: f64, sample_rate: u32) -> Self {
        let mut bank = Self::new(sample_rate);
        bank.set_partials(Partial::from_series(series, base_frequency));
        bank
    }

    /// Replace the partials. Running phases carry over for partials whose
    /// frequency is unchanged so edits don't click.
    pub fn set_partials(&mut self, partials: Vec<Partial>) {
        let phases = partials
            .iter()
            .map(|p| {
                self.partials
                    .iter()
                    .position(|old| old.frequency == p.frequency)
                    .map(|pos| self.phases[pos])
                    .unwrap_or(0.0)
            })
            .collect();
        self.partials = partials;
        self.phases = phases;
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    pub fn is_silent(&self) -> bool {
        self.partials.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Produce the next mono sample and advance every phase.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let dt = 1.0 / self.sample_rate as f64;
        let mut value = 0.0;
        for (partial, phase) in self.partials.iter().zip(self.phases.iter_mut()) {
            value += partial.amplitude * (TAU * *phase + partial.phase_offset).sin();
            *phase = (*phase + partial.frequency * dt).fract();
        }
        value
    }

    /// Fill an interleaved buffer, writing the same sample to each channel.
    pub fn render(&mut self, output: &mut [f32], channels: u16, gain: f32) {
        let channels = channels.max(1) as usize;
        for frame in output.chunks_mut(channels) {
            let sample = self.next_sample() as f32 * gain;
            for out in frame.iter_mut() {
                *out = sample;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmonic::Harmonic;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn skips_silent_harmonics() {
        let partials = Partial::from_series(&HarmonicSeries::square(), 100.0);
        assert_eq!(partials.len(), 8);
        assert_approx_eq!(partials[1].frequency, 300.0, 1e-9);
    }

    #[test]
    fn fundamental_tracks_sine() {
        let sr = 48_000;
        let mut bank = OscillatorBank::from_series(&HarmonicSeries::default(), 1000.0, sr);
        for n in 0..96 {
            let expected = (TAU * 1000.0 * n as f64 / sr as f64).sin();
            assert_approx_eq!(bank.next_sample(), expected, 1e-9);
        }
    }

    #[test]
    fn shift_offsets_phase() {
        let series = HarmonicSeries::new(vec![Harmonic::new(0, 1.0, 0.25)]);
        let mut bank = OscillatorBank::from_series(&series, 220.0, 44_100);
        assert_approx_eq!(bank.next_sample(), 1.0, 1e-12);
    }

    #[test]
    fn phases_survive_amplitude_edits() {
        let series = HarmonicSeries::default();
        let mut bank = OscillatorBank::from_series(&series, 220.0, 44_100);
        for _ in 0..100 {
            bank.next_sample();
        }
        let before = bank.phases[0];
        bank.set_partials(Partial::from_series(&series.with_amplify(0, 0.5), 220.0));
        assert_eq!(bank.phases[0], before);
    }

    #[test]
    fn render_duplicates_channels() {
        let mut bank = OscillatorBank::from_series(&HarmonicSeries::default(), 440.0, 44_100);
        let mut out = vec![0.0f32; 64];
        bank.render(&mut out, 2, 0.5);
        for frame in out.chunks(2) {
            assert_eq!(frame[0], frame[1]);
            assert!(frame[0].abs() <= 0.5);
        }
        assert!(out.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn empty_bank_is_silent() {
        let mut bank = OscillatorBank::new(44_100);
        assert!(bank.is_silent());
        assert_eq!(bank.next_sample(), 0.0);
    }
}
