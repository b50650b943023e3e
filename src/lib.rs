//! Harmonia — additive harmonic synthesis with a polar periodicity view.

pub mod audio;
pub mod config;
pub mod harmonic;
pub mod plot;
pub mod polar;
pub mod signal;
pub mod synth;
pub mod tui;
