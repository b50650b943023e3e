//! Application configuration — loaded from ~/.harmonia/config.yaml.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::polar::{
    PolarConfig, DEFAULT_DISCRETIZATION, DEFAULT_OVERSAMPLING, MAX_COMPRESSION,
};
use crate::synth::MeanDivisor;

/// Explorer and playback settings. Every field may be omitted in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Samples per cycle for the waveform view.
    pub waveform_discretization: usize,
    /// Angular bins for the polar view.
    pub polar_discretization: usize,
    /// Source steps per polar bin.
    pub oversampling: f64,
    /// Fundamental frequency for playback and export, in Hz.
    pub base_frequency: f64,
    /// Increment applied by the compression keys.
    pub compression_step: f64,
    /// Upper limit for compression in the explorer.
    pub max_compression: f64,
    /// Delay before an edited series is written to disk.
    pub persist_debounce_ms: u64,
    /// Averaging used for the playback loudness proxy.
    pub mean_divisor: MeanDivisor,
}

impl AppConfig {
    /// Load config from the standard path (~/.harmonia/config.yaml).
    /// Returns None if the file doesn't exist or doesn't parse.
    pub fn load() -> Option<Self> {
        Self::load_at(&default_config_path()?)
    }

    fn load_at(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_yaml::from_str::<Self>(&content) {
            Ok(config) => Some(config.sanitized()),
            Err(e) => {
                log::warn!("ignoring {}: {e}", path.display());
                None
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str::<Self>(&content)
            .map(Self::sanitized)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Replace values the explorer cannot work with by their defaults.
    ///
    /// Steps, limits and rates must be finite; counts and rates positive;
    /// `max_compression` within `[0, MAX_COMPRESSION]`.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f64, fallback: f64, name: &str| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                log::warn!("config {name} = {value} is unusable, using {fallback}");
                fallback
            }
        };
        let count = |value: usize, fallback: usize, name: &str| {
            if value > 0 {
                value
            } else {
                log::warn!("config {name} = 0 is unusable, using {fallback}");
                fallback
            }
        };

        let max_compression = if self.max_compression.is_finite() {
            self.max_compression.clamp(0.0, MAX_COMPRESSION)
        } else {
            log::warn!(
                "config max_compression = {} is unusable, using {}",
                self.max_compression,
                defaults.max_compression
            );
            defaults.max_compression
        };

        Self {
            waveform_discretization: count(
                self.waveform_discretization,
                defaults.waveform_discretization,
                "waveform_discretization",
            ),
            polar_discretization: count(
                self.polar_discretization,
                defaults.polar_discretization,
                "polar_discretization",
            ),
            oversampling: positive(self.oversampling, defaults.oversampling, "oversampling"),
            base_frequency: positive(
                self.base_frequency,
                defaults.base_frequency,
                "base_frequency",
            ),
            compression_step: positive(
                self.compression_step,
                defaults.compression_step,
                "compression_step",
            ),
            max_compression,
            ..self
        }
    }

    /// Polar binning parameters derived from this config.
    pub fn polar(&self) -> PolarConfig {
        PolarConfig::new(self.polar_discretization).with_oversampling(self.oversampling)
    }
}

/// Standard config location, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".harmonia").join("config.yaml"))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            waveform_discretization: 800,
            polar_discretization: DEFAULT_DISCRETIZATION,
            oversampling: DEFAULT_OVERSAMPLING,
            base_frequency: 220.0,
            compression_step: 0.01,
            max_compression: 0.98,
            persist_debounce_ms: 50,
            mean_divisor: MeanDivisor::Legacy,
        }
    }
}
