//! Series persistence — versioned JSON load/save/reset.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::HarmonicSeries;

/// Format version written alongside every persisted series.
pub const HARMONICS_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SeriesFile {
    version: u32,
    harmonics: HarmonicSeries,
}

/// Just the version tag, so files from other versions can be skipped
/// without understanding the rest of their layout.
#[derive(Debug, Deserialize)]
struct VersionTag {
    version: u32,
}

/// Default path for the persisted series.
pub fn default_series_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".harmonia");
    path.push("harmonics.json");
    path
}

/// Load a series from a JSON file.
///
/// Returns `Ok(None)` when the file doesn't exist or carries a different
/// format version; the caller falls back to its defaults.
pub fn load_series(path: &Path) -> Result<Option<HarmonicSeries>, io::Error> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let tag: VersionTag = serde_json::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if tag.version != HARMONICS_VERSION {
        log::warn!(
            "ignoring {}: format version {} (expected {HARMONICS_VERSION})",
            path.display(),
            tag.version
        );
        return Ok(None);
    }
    let file: SeriesFile = serde_json::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(file.harmonics))
}

/// Load a series, falling back to the default on any failure.
///
/// A missing file is silent; an unreadable or malformed one is logged.
pub fn load_series_or_default(path: &Path) -> HarmonicSeries {
    match load_series(path) {
        Ok(series) => series.unwrap_or_default(),
        Err(e) => {
            log::warn!("ignoring {}: {e}", path.display());
            HarmonicSeries::default()
        }
    }
}

/// Save a series to a JSON file, creating parent directories as needed.
pub fn save_series(path: &Path, series: &HarmonicSeries) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = SeriesFile {
        version: HARMONICS_VERSION,
        harmonics: series.clone(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(io::Error::other)?;
    std::fs::write(path, json)?;
    log::debug!("saved {} harmonics to {}", series.len(), path.display());
    Ok(())
}

/// Remove the persisted series and return the default one.
pub fn reset_series(path: &Path) -> Result<HarmonicSeries, io::Error> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(HarmonicSeries::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmonic::Harmonic;
    use tempfile::NamedTempFile;

    #[test]
    fn load_nonexistent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(load_series(&path).unwrap().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let series = HarmonicSeries::square().with_shift(2, 0.25);

        save_series(file.path(), &series).unwrap();
        let loaded = load_series(file.path()).unwrap();

        assert_eq!(loaded, Some(series));
    }

    #[test]
    fn version_mismatch_returns_none() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"version": 0, "harmonics": [{"index": 0, "amplify": 1, "shift": 0}]}"#,
        )
        .unwrap();
        assert!(load_series(file.path()).unwrap().is_none());
    }

    #[test]
    fn future_layout_with_other_version_is_skipped() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"version": 2, "partials": "opaque"}"#).unwrap();
        assert!(load_series(file.path()).unwrap().is_none());
    }

    #[test]
    fn malformed_json_is_invalid_data() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{not json").unwrap();
        let err = load_series(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn tolerates_arbitrary_length() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"version": 1, "harmonics": [
                {"index": 0, "amplify": 0.5, "shift": 0},
                {"index": 4, "amplify": 0.25, "shift": 0.5},
                {"index": 4, "amplify": 0.1, "shift": 0}
            ]}"#,
        )
        .unwrap();
        let series = load_series(file.path()).unwrap().unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(1), Some(&Harmonic::new(4, 0.25, 0.5)));
    }

    #[test]
    fn reset_removes_file() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        save_series(&path, &HarmonicSeries::sawtooth()).unwrap();
        assert!(path.exists());

        let fresh = reset_series(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(fresh, HarmonicSeries::default());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("harmonics.json");
        save_series(&path, &HarmonicSeries::default()).unwrap();
        assert!(path.exists());
    }
}
