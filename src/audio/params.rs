//! Playback parameters derived from a harmonic series.

use std::f64::consts::TAU;

use serde::Serialize;

use crate::harmonic::{Harmonic, HarmonicSeries};

/// Default fundamental frequency in Hz.
pub const DEFAULT_BASE_FREQUENCY: f64 = 220.0;

/// Highest normalization factor the master gain honours.
pub const VOLUME_CAP: f64 = 3.0;

/// Oscillator settings for one harmonic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HarmonicParams {
    /// Frequency in Hz: `base * (index + 1)`.
    pub frequency: f64,
    /// Period in seconds.
    pub period: f64,
    /// Delay that realizes the phase shift, in seconds.
    pub delay_time: f64,
}

impl HarmonicParams {
    pub fn new(harmonic: &Harmonic, base_frequency: f64) -> Self {
        let frequency = base_frequency * harmonic.multiplier();
        let period = 1.0 / frequency;
        Self {
            frequency,
            period,
            delay_time: period * harmonic.shift,
        }
    }
}

/// Master gain for a normalization factor, capped at [`VOLUME_CAP`].
pub fn calculate_volume(volume: f64) -> f64 {
    if volume > 1.0 {
        log::debug!("volume cap reached: {volume:.3}");
    }
    0.3 * volume.clamp(0.0, VOLUME_CAP) / 2.0
}

/// Loudness normalization factor for a mean absolute level.
///
/// Silent input has no meaningful factor and yields 0, which mutes.
pub fn normalization_factor(mean_abs: f64) -> f64 {
    if mean_abs > 0.0 && mean_abs.is_finite() {
        1.0 / mean_abs
    } else {
        0.0
    }
}

/// Coefficient slots a [`PeriodicWave`] keeps: half of an 8192-sample
/// wavetable, the most partials such a table can represent.
pub const MAX_PERIODIC_WAVE_LEN: usize = 4096;

/// Fourier coefficients of a single-oscillator periodic wave.
///
/// Slot `k` holds the cosine (`real`) and sine (`imag`) terms of the
/// `k`-th multiple of the fundamental; slot 0 is DC and always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicWave {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl PeriodicWave {
    /// Build coefficients by walking each harmonic's shift around the four
    /// quadrants of the (real, imag) plane with square-root easing.
    ///
    /// Harmonics whose order does not fit in [`MAX_PERIODIC_WAVE_LEN`]
    /// slots are left out.
    pub fn from_series(series: &HarmonicSeries) -> Self {
        let len = series
            .max_multiplier()
            .saturating_add(1)
            .min(MAX_PERIODIC_WAVE_LEN as u64) as usize;
        let mut real = vec![0.0; len];
        let mut imag = vec![0.0; len];

        for harmonic in series {
            let Some(slot) = usize::try_from(harmonic.order()).ok().filter(|s| *s < len) else {
                log::debug!("harmonic {} beyond periodic wave table", harmonic.order());
                continue;
            };
            let (r, i) = quadrant_coefficients(harmonic.amplify, harmonic.shift);
            real[slot] = r;
            imag[slot] = i;
        }

        Self { real, imag }
    }

    /// Evaluate the wave at `phase` in cycles.
    pub fn evaluate(&self, phase: f64) -> f64 {
        self.real
            .iter()
            .zip(&self.imag)
            .enumerate()
            .skip(1)
            .map(|(k, (r, i))| {
                let angle = TAU * k as f64 * phase;
                r * angle.cos() + i * angle.sin()
            })
            .sum()
    }
}

fn quadrant_coefficients(amplify: f64, shift: f64) -> (f64, f64) {
    let (t, re_sign, im_sign) = if shift < 0.25 {
        (shift * 4.0, 1.0, 1.0)
    } else if shift < 0.5 {
        (1.0 - (shift - 0.25) * 4.0, -1.0, 1.0)
    } else if shift < 0.75 {
        ((shift - 0.5) * 4.0, -1.0, -1.0)
    } else {
        (1.0 - (shift - 0.75) * 4.0, 1.0, -1.0)
    };
    let t = t.clamp(0.0, 1.0);
    (
        re_sign * amplify * (1.0 - t).sqrt(),
        im_sign * amplify * t.sqrt(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn params_serialize_timing() {
        let p = HarmonicParams::new(&Harmonic::new(0, 1.0, 0.25), 200.0);
        let value = serde_json::to_value(p).unwrap();
        assert_approx_eq!(value["frequency"].as_f64().unwrap(), 200.0, 1e-9);
        assert_approx_eq!(value["period"].as_f64().unwrap(), 0.005, 1e-12);
        assert_approx_eq!(value["delay_time"].as_f64().unwrap(), 0.00125, 1e-12);
    }

    #[test]
    fn params_follow_index() {
        let p = HarmonicParams::new(&Harmonic::new(2, 1.0, 0.5), 220.0);
        assert_approx_eq!(p.frequency, 660.0, 1e-9);
        assert_approx_eq!(p.period, 1.0 / 660.0, 1e-12);
        assert_approx_eq!(p.delay_time, 0.5 / 660.0, 1e-12);
    }

    #[test]
    fn volume_is_capped() {
        assert_approx_eq!(calculate_volume(1.0), 0.15, 1e-12);
        assert_approx_eq!(calculate_volume(10.0), 0.45, 1e-12);
        assert_eq!(calculate_volume(-1.0), 0.0);
    }

    #[test]
    fn normalization_guards_silence() {
        assert_eq!(normalization_factor(0.0), 0.0);
        assert_eq!(normalization_factor(f64::NAN), 0.0);
        assert_approx_eq!(normalization_factor(0.5), 2.0, 1e-12);
    }

    #[test]
    fn unshifted_harmonic_lands_on_cosine_term() {
        let wave = PeriodicWave::from_series(&HarmonicSeries::default());
        assert_eq!(wave.real.len(), 17);
        assert_eq!(wave.real[0], 0.0);
        assert_approx_eq!(wave.real[1], 1.0, 1e-12);
        assert_approx_eq!(wave.imag[1], 0.0, 1e-12);
        assert_approx_eq!(wave.evaluate(0.0), 1.0, 1e-12);
    }

    #[test]
    fn quadrants_have_expected_signs() {
        let (r, i) = quadrant_coefficients(1.0, 0.25);
        assert_approx_eq!(r, -0.0, 1e-12);
        assert_approx_eq!(i, 1.0, 1e-12);
        let (r, i) = quadrant_coefficients(1.0, 0.5);
        assert_approx_eq!(r, -1.0, 1e-12);
        assert_approx_eq!(i, 0.0, 1e-12);
        let (r, i) = quadrant_coefficients(1.0, 0.75);
        assert_approx_eq!(r, 0.0, 1e-12);
        assert_approx_eq!(i, -1.0, 1e-12);
    }

    #[test]
    fn sparse_indices_size_coefficients() {
        let series = HarmonicSeries::new(vec![Harmonic::new(5, 0.5, 0.0)]);
        let wave = PeriodicWave::from_series(&series);
        assert_eq!(wave.real.len(), 7);
        assert_approx_eq!(wave.real[6], 0.5, 1e-12);
    }

    #[test]
    fn out_of_table_harmonics_are_dropped() {
        let series = HarmonicSeries::new(vec![
            Harmonic::new(0, 1.0, 0.0),
            Harmonic::new(1_000_000_000, 0.5, 0.0),
            Harmonic::new(u32::MAX, 0.5, 0.0),
        ]);
        let wave = PeriodicWave::from_series(&series);
        assert_eq!(wave.real.len(), MAX_PERIODIC_WAVE_LEN);
        assert_approx_eq!(wave.real[1], 1.0, 1e-12);
        assert_eq!(wave.real.iter().filter(|r| **r != 0.0).count(), 1);
    }
}
