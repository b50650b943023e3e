//! Explorer session state — view settings restored on the next launch.
//!
//! The series lives in its own JSON file; everything else the explorer
//! remembers goes into `explorer.yaml` next to it.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const STATE_FILE: &str = "explorer.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerState {
    pub compression: f64,
}

/// `explorer.yaml` in the directory holding `series_path`.
pub fn state_path_beside(series_path: &Path) -> PathBuf {
    match series_path.parent() {
        Some(dir) => dir.join(STATE_FILE),
        None => PathBuf::from(STATE_FILE),
    }
}

/// Read saved state. `Ok(None)` when nothing has been saved yet.
pub fn load_state(path: &Path) -> Result<Option<ExplorerState>, io::Error> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn save_state(path: &Path, state: &ExplorerState) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(state).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}
