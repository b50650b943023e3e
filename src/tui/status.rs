//! Status bar — playback state, compression, and waveform levels.

/// Values shown in the explorer's status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub is_playing: bool,
    pub compression: f64,
    pub peak: f64,
    pub mean_abs: f64,
    /// Empty bins in the current polar trace.
    pub gaps: usize,
    /// Whether an edit is waiting to be written to disk.
    pub unsaved: bool,
}

impl StatusInfo {
    pub fn playback_display(&self) -> &str {
        if self.is_playing {
            "PLAY"
        } else {
            "STOP"
        }
    }

    /// Compression with the candidate period it implies.
    pub fn compression_display(&self) -> String {
        format!(
            "compression {:.2} (period {:.2})",
            self.compression,
            1.0 - self.compression
        )
    }

    pub fn levels_display(&self) -> String {
        format!("peak {:.3}  mean {:.3}", self.peak, self.mean_abs)
    }

    /// The whole bar as one line.
    pub fn line(&self) -> String {
        let mut line = format!(
            " {}  {}  {}  gaps {}",
            self.playback_display(),
            self.compression_display(),
            self.levels_display(),
            self.gaps
        );
        if self.unsaved {
            line.push_str("  *");
        }
        line
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self {
            is_playing: false,
            compression: 0.0,
            peak: 0.0,
            mean_abs: 0.0,
            gaps: 0,
            unsaved: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_display() {
        let playing = StatusInfo {
            is_playing: true,
            ..Default::default()
        };
        assert_eq!(playing.playback_display(), "PLAY");
        assert_eq!(StatusInfo::default().playback_display(), "STOP");
    }

    #[test]
    fn compression_shows_period() {
        let status = StatusInfo {
            compression: 0.25,
            ..Default::default()
        };
        assert_eq!(status.compression_display(), "compression 0.25 (period 0.75)");
    }

    #[test]
    fn unsaved_marker() {
        let status = StatusInfo {
            unsaved: true,
            ..Default::default()
        };
        assert!(status.line().ends_with('*'));
        assert!(!StatusInfo::default().line().ends_with('*'));
    }
}
