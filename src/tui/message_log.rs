//! Message log — bounded buffer of recent warnings shown in an overlay.
//!
//! The terminal is in raw mode while the explorer runs, so problems that
//! would otherwise go to stderr are collected here and mirrored to `log`.

use std::collections::VecDeque;
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct MessageEntry {
    pub timestamp: SystemTime,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<MessageEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a message, evicting the oldest at capacity.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(MessageEntry {
            timestamp: SystemTime::now(),
            message,
        });
    }

    /// The `n` most recent entries, newest last.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn latest(&self) -> Option<&MessageEntry> {
        self.entries.back()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(50)
    }
}
