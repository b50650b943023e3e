//! Harmonic synthesizer — one sampled cycle of a harmonic series plus
//! its peak and mean absolute level.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::harmonic::Harmonic;

/// How the mean absolute level is averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeanDivisor {
    /// Sum of `|sample|` over all `discretization + 1` samples divided by
    /// `discretization`. Persisted volume settings were tuned against this.
    #[default]
    Legacy,
    /// Divide by the actual number of samples.
    Samples,
}

/// One sampled cycle of a harmonic series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waveform {
    /// `discretization + 1` samples covering `0..=2π`.
    pub samples: Vec<f64>,
    /// Maximum absolute sample value.
    pub peak: f64,
    /// Sum of absolute sample values divided by `discretization`.
    pub mean_abs: f64,
}

impl Waveform {
    /// Number of intervals the cycle was divided into.
    pub fn discretization(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// Mean of `|sample|` over the true sample count.
    pub fn sample_mean_abs(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.abs()).sum::<f64>() / self.samples.len() as f64
    }

    /// Mean absolute level under the chosen averaging.
    pub fn mean_abs_with(&self, divisor: MeanDivisor) -> f64 {
        match divisor {
            MeanDivisor::Legacy => self.mean_abs,
            MeanDivisor::Samples => self.sample_mean_abs(),
        }
    }

    /// Whether every sample is zero.
    pub fn is_silent(&self) -> bool {
        self.peak == 0.0
    }
}

/// Sample one full cycle of the series at `discretization + 1` evenly
/// spaced angles from `0` to `2π` inclusive.
///
/// Components with `amplify == 0` are skipped.
///
/// # Panics
///
/// Panics if `discretization` is zero.
pub fn synthesize(harmonics: &[Harmonic], discretization: usize) -> Waveform {
    assert!(discretization > 0, "discretization must be positive");

    let audible: Vec<&Harmonic> = harmonics.iter().filter(|h| h.is_audible()).collect();
    let mut samples = Vec::with_capacity(discretization + 1);
    let mut peak = 0.0_f64;
    let mut area = 0.0_f64;

    for x in 0..=discretization {
        let rad = (x as f64 / discretization as f64) * TAU;
        let value: f64 = audible
            .iter()
            .map(|h| h.amplify * (h.multiplier() * rad + h.phase()).sin())
            .sum();

        let abs = value.abs();
        area += abs;
        if abs >= peak {
            peak = abs;
        }
        samples.push(value);
    }

    Waveform {
        samples,
        peak,
        mean_abs: area / discretization as f64,
    }
}
