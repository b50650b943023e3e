//! Error types for polar remapping.

use std::fmt;

/// An error raised while folding a signal onto a circle.
#[derive(Debug, Clone, PartialEq)]
pub enum PolarError {
    /// Compression outside `[0, MAX_COMPRESSION]` or not finite.
    DegenerateCompression(f64),
    /// Zero output bins requested.
    ZeroDiscretization,
    /// Oversampling factor must be finite and positive.
    InvalidOversampling(f64),
    /// A fractional lookup landed beyond the end of the signal.
    IndexOutOfRange { index: f64, len: usize },
    /// Interpolation produced NaN (the signal holds a non-finite value).
    NonFiniteSample { index: f64 },
}

impl fmt::Display for PolarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolarError::DegenerateCompression(c) => {
                write!(f, "compression {c} leaves no usable cycle")
            }
            PolarError::ZeroDiscretization => write!(f, "discretization must be positive"),
            PolarError::InvalidOversampling(o) => write!(f, "invalid oversampling factor {o}"),
            PolarError::IndexOutOfRange { index, len } => {
                write!(f, "lookup index {index} out of range for signal of length {len}")
            }
            PolarError::NonFiniteSample { index } => {
                write!(f, "non-finite sample around index {index}")
            }
        }
    }
}

impl std::error::Error for PolarError {}
