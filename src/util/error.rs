//! Error types for ghmatch.

use thiserror::Error;

/// Result alias for ghmatch operations.
pub type GhMatchResult<T> = std::result::Result<T, GhMatchError>;

/// Errors that can occur when building tables or voting.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GhMatchError {
    /// Width or height is zero, or the element count overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is shorter than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Sub-sampling step must be at least 1.
    #[error("invalid loop step {step}: must be at least 1")]
    InvalidStep { step: usize },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image decoding or encoding failed.
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
