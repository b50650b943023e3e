//! Polar remapper — folds a linear signal onto a circle whose period is a
//! chosen fraction of the signal length.
//!
//! Sweeping the compression reveals whether the signal repeats at that
//! candidate period: a periodic signal folds into a clean closed trace,
//! anything else smears. This is a scanning visualization, not an FFT.

pub mod error;

use serde::{Serialize, Serializer};

pub use error::PolarError;

/// Largest accepted compression. Smaller cycles explode the step count.
pub const MAX_COMPRESSION: f64 = 0.99;

/// Default number of angular bins.
pub const DEFAULT_DISCRETIZATION: usize = 500;

/// Default source steps per output bin.
pub const DEFAULT_OVERSAMPLING: f64 = 10.0;

/// One angular bin of a folded signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadialBin {
    Defined(f64),
    /// No samples landed in this bin.
    Empty,
}

impl RadialBin {
    pub fn value(&self) -> Option<f64> {
        match self {
            RadialBin::Defined(v) => Some(*v),
            RadialBin::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RadialBin::Empty)
    }
}

impl Serialize for RadialBin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Binning parameters for [`remap_to_polar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarConfig {
    /// Number of output bins around the circle.
    pub discretization: usize,
    /// Source steps taken per output bin over one candidate cycle.
    pub oversampling: f64,
}

impl PolarConfig {
    pub fn new(discretization: usize) -> Self {
        Self {
            discretization,
            ..Self::default()
        }
    }

    pub fn with_oversampling(mut self, oversampling: f64) -> Self {
        self.oversampling = oversampling;
        self
    }
}

impl Default for PolarConfig {
    fn default() -> Self {
        Self {
            discretization: DEFAULT_DISCRETIZATION,
            oversampling: DEFAULT_OVERSAMPLING,
        }
    }
}

/// Fraction of the signal length treated as one period.
pub fn candidate_period(compression: f64) -> f64 {
    1.0 - compression
}

/// Fold `signal` onto `config.discretization` angular bins using a cycle of
/// `1 - compression` of the signal length.
///
/// Each bin holds the mean of the interpolated samples folded into it,
/// normalized so the largest magnitude is 1. Bins that received nothing
/// stay [`RadialBin::Empty`]. An empty signal yields all-empty bins.
pub fn remap_to_polar(
    signal: &[f64],
    compression: f64,
    config: &PolarConfig,
) -> Result<Vec<RadialBin>, PolarError> {
    let discretization = config.discretization;
    if discretization == 0 {
        return Err(PolarError::ZeroDiscretization);
    }
    if !(config.oversampling.is_finite() && config.oversampling > 0.0) {
        return Err(PolarError::InvalidOversampling(config.oversampling));
    }
    if !compression.is_finite() || !(0.0..=MAX_COMPRESSION).contains(&compression) {
        return Err(PolarError::DegenerateCompression(compression));
    }

    let mut sums = vec![0.0_f64; discretization];
    let mut counts = vec![0_u32; discretization];

    if !signal.is_empty() {
        let len = signal.len() as f64;
        let cycle = candidate_period(compression);
        let iteration = len * cycle / discretization as f64 / config.oversampling;
        let last = len - 1.0;

        let mut step = 0_u64;
        loop {
            let i = step as f64 * iteration;
            if i > last {
                break;
            }
            let place_on_cycle = ((i / len) % cycle) / cycle;
            let value = lookup(signal, i)?;
            let bin = ((place_on_cycle * discretization as f64).floor() as usize)
                .min(discretization - 1);

            sums[bin] += value;
            counts[bin] += 1;
            step += 1;
        }
        log::trace!(
            "folded {step} steps into {discretization} bins (cycle {cycle:.3})"
        );
    }

    let mut bins: Vec<RadialBin> = sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &count)| {
            if count > 0 {
                RadialBin::Defined(sum / count as f64)
            } else {
                RadialBin::Empty
            }
        })
        .collect();

    normalize(&mut bins);
    Ok(bins)
}

/// [`remap_to_polar`] with the default oversampling.
pub fn remap_to_polar_default(
    signal: &[f64],
    compression: f64,
    discretization: usize,
) -> Result<Vec<RadialBin>, PolarError> {
    remap_to_polar(signal, compression, &PolarConfig::new(discretization))
}

/// Sample `values` at a fractional index by linear interpolation.
///
/// An index whose upper neighbour is past the end reads the last element;
/// an index whose lower neighbour is past the end is an error.
pub fn lookup(values: &[f64], index: f64) -> Result<f64, PolarError> {
    let len = values.len();
    if !(index >= 0.0) {
        return Err(PolarError::IndexOutOfRange { index, len });
    }
    let near_down = index.floor() as usize;
    let near_up = index.ceil() as usize;

    if near_down >= len {
        return Err(PolarError::IndexOutOfRange { index, len });
    }
    if near_up >= len {
        return Ok(values[len - 1]);
    }

    let fract = index.fract();
    let out = (1.0 - fract) * values[near_down] + fract * values[near_up];
    if out.is_nan() {
        return Err(PolarError::NonFiniteSample { index });
    }
    Ok(out)
}

/// Scale defined bins so the largest magnitude becomes 1.
///
/// All-zero or all-empty input is left unchanged.
pub fn normalize(bins: &mut [RadialBin]) {
    let max = bins
        .iter()
        .filter_map(RadialBin::value)
        .fold(0.0_f64, |m, v| m.max(v.abs()));

    if max != 0.0 {
        for bin in bins.iter_mut() {
            if let RadialBin::Defined(v) = bin {
                *v /= max;
            }
        }
    }
}

/// Number of bins that received no samples.
pub fn gap_count(bins: &[RadialBin]) -> usize {
    bins.iter().filter(|b| b.is_empty()).count()
}
