//! Harmonic series model — immutable (amplify, shift, index) components.
//!
//! A [`HarmonicSeries`] is a plain value. UI handlers never mutate a series
//! in place; they derive a new one with [`HarmonicSeries::with_amplify`] or
//! [`HarmonicSeries::with_shift`] and hand that to the synthesizer.

pub mod persistence;

use serde::{Deserialize, Serialize};

pub use persistence::{
    default_series_path, load_series, load_series_or_default, reset_series, save_series,
    HARMONICS_VERSION,
};

/// Number of components in the default series (fundamental + 15 overtones).
pub const DEFAULT_HARMONIC_COUNT: usize = 16;

/// One sinusoidal component of a harmonic series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Order in the series. The angular multiplier is `index + 1`.
    pub index: u32,
    /// Amplitude weight in `[0, 1]`.
    pub amplify: f64,
    /// Normalized phase offset in `[0, 1]`; 1.0 is one full period.
    pub shift: f64,
}

impl Harmonic {
    pub fn new(index: u32, amplify: f64, shift: f64) -> Self {
        Self {
            index,
            amplify,
            shift,
        }
    }

    /// A silent component at the given order.
    pub fn silent(index: u32) -> Self {
        Self::new(index, 0.0, 0.0)
    }

    /// Angular multiplier relative to the fundamental.
    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.index as f64 + 1.0
    }

    /// 1-based harmonic number. Widened so `u32::MAX` has an order too.
    #[inline]
    pub fn order(&self) -> u64 {
        u64::from(self.index) + 1
    }

    /// Phase offset in radians.
    #[inline]
    pub fn phase(&self) -> f64 {
        self.shift * std::f64::consts::TAU
    }

    /// Whether this component contributes anything to the signal.
    #[inline]
    pub fn is_audible(&self) -> bool {
        self.amplify != 0.0
    }
}

/// An ordered, owned sequence of harmonics.
///
/// Position in the sequence is not authoritative: `index` is explicit and
/// may have gaps or duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HarmonicSeries {
    harmonics: Vec<Harmonic>,
}

impl HarmonicSeries {
    pub fn new(harmonics: Vec<Harmonic>) -> Self {
        Self { harmonics }
    }

    /// `count` silent components with indices `0..count`.
    pub fn silent(count: usize) -> Self {
        Self::new((0..count as u32).map(Harmonic::silent).collect())
    }

    /// Square-like timbre: odd harmonics at `1 / n`.
    pub fn square() -> Self {
        Self::from_amplitudes(|pos| {
            if pos % 2 == 0 {
                1.0 / (pos as f64 + 1.0)
            } else {
                0.0
            }
        })
    }

    /// Sawtooth-like timbre: every harmonic at `1 / n`.
    pub fn sawtooth() -> Self {
        Self::from_amplitudes(|pos| 1.0 / (pos as f64 + 1.0))
    }

    /// Triangle-like timbre: odd harmonics at `1 / n^2`, every other one
    /// shifted by half a period.
    pub fn triangle() -> Self {
        let harmonics = (0..DEFAULT_HARMONIC_COUNT)
            .map(|pos| {
                if pos % 2 != 0 {
                    return Harmonic::silent(pos as u32);
                }
                let n = pos as f64 + 1.0;
                let shift = if pos % 4 == 2 { 0.5 } else { 0.0 };
                Harmonic::new(pos as u32, 1.0 / (n * n), shift)
            })
            .collect();
        Self::new(harmonics)
    }

    fn from_amplitudes(amplitude: impl Fn(usize) -> f64) -> Self {
        let harmonics = (0..DEFAULT_HARMONIC_COUNT)
            .map(|pos| Harmonic::new(pos as u32, amplitude(pos), 0.0))
            .collect();
        Self::new(harmonics)
    }

    /// Look up a preset by name (`default`, `square`, `sawtooth`/`saw`, `triangle`).
    pub fn preset(name: &str) -> Option<Self> {
        Preset::from_name(name).map(Preset::series)
    }

    pub fn as_slice(&self) -> &[Harmonic] {
        &self.harmonics
    }

    pub fn get(&self, pos: usize) -> Option<&Harmonic> {
        self.harmonics.get(pos)
    }

    pub fn len(&self) -> usize {
        self.harmonics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.harmonics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Harmonic> {
        self.harmonics.iter()
    }

    /// Components with a non-zero amplitude.
    pub fn audible(&self) -> impl Iterator<Item = &Harmonic> {
        self.harmonics.iter().filter(|h| h.is_audible())
    }

    /// Largest angular multiplier in the series, or 0 for an empty series.
    pub fn max_multiplier(&self) -> u64 {
        self.harmonics
            .iter()
            .map(Harmonic::order)
            .max()
            .unwrap_or(0)
    }

    /// A new series with the amplitude at `pos` replaced (clamped to `[0, 1]`).
    ///
    /// Returns an unchanged copy when `pos` is out of range.
    pub fn with_amplify(&self, pos: usize, amplify: f64) -> Self {
        self.with_component(pos, |h| Harmonic {
            amplify: clamp_unit(amplify),
            ..h
        })
    }

    /// A new series with the phase shift at `pos` replaced (clamped to `[0, 1]`).
    pub fn with_shift(&self, pos: usize, shift: f64) -> Self {
        self.with_component(pos, |h| Harmonic {
            shift: clamp_unit(shift),
            ..h
        })
    }

    fn with_component(&self, pos: usize, update: impl FnOnce(Harmonic) -> Harmonic) -> Self {
        let mut harmonics = self.harmonics.clone();
        if let Some(slot) = harmonics.get_mut(pos) {
            *slot = update(*slot);
        }
        Self::new(harmonics)
    }
}

/// Named starting points for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Fundamental only.
    Default,
    Square,
    Sawtooth,
    Triangle,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Default,
        Preset::Square,
        Preset::Sawtooth,
        Preset::Triangle,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" | "sine" => Some(Preset::Default),
            "square" => Some(Preset::Square),
            "sawtooth" | "saw" => Some(Preset::Sawtooth),
            "triangle" => Some(Preset::Triangle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Square => "square",
            Preset::Sawtooth => "sawtooth",
            Preset::Triangle => "triangle",
        }
    }

    pub fn series(self) -> HarmonicSeries {
        match self {
            Preset::Default => HarmonicSeries::default(),
            Preset::Square => HarmonicSeries::square(),
            Preset::Sawtooth => HarmonicSeries::sawtooth(),
            Preset::Triangle => HarmonicSeries::triangle(),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Default for HarmonicSeries {
    fn default() -> Self {
        Self::silent(DEFAULT_HARMONIC_COUNT).with_amplify(0, 1.0)
    }
}

impl From<Vec<Harmonic>> for HarmonicSeries {
    fn from(harmonics: Vec<Harmonic>) -> Self {
        Self::new(harmonics)
    }
}

impl<'a> IntoIterator for &'a HarmonicSeries {
    type Item = &'a Harmonic;
    type IntoIter = std::slice::Iter<'a, Harmonic>;

    fn into_iter(self) -> Self::IntoIter {
        self.harmonics.iter()
    }
}
