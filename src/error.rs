//! Error types for field integration, encoding and matching.

use thiserror::Error;

/// Errors raised by the tau-field core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// Parameters rejected before any allocation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A non-finite value was written while stepping an unclamped field.
    #[error("numeric divergence at (t={t}, x={x}, y={y}, z={z})")]
    NumericDivergence {
        t: usize,
        x: usize,
        y: usize,
        z: usize,
    },

    /// Encoder input contains NaN or infinity.
    #[error("non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    /// Spectrum axes are empty or of unequal length.
    #[error("invalid spectrum: {0}")]
    InvalidSpectrum(String),

    /// A spectrum provider could not produce a curve.
    #[error("spectrum unavailable: {0}")]
    SpectrumUnavailable(String),
}

/// Result type for tau-field operations.
pub type Result<T> = std::result::Result<T, FieldError>;
