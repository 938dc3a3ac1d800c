//! Error types for recording decode, statistics and filter characterization.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source recording does not exist
    #[error("File {} not found", path.display())]
    FileNotFound { path: PathBuf },

    /// Recording exists but could not be read
    #[error("Error reading file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Channel count must be at least 1, got {0}")]
    InvalidChannelCount(usize),

    #[error("Channel {channel} out of range for a {channels}-channel recording")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("Recording contains no samples")]
    EmptyRecording,

    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Zero-RMS reference in a ratio
    #[error("Division by zero: {0}")]
    DivideByZero(&'static str),

    #[error("No frequency lies in the passband")]
    EmptyPassband,

    /// Fewer than two points at or below the bandwidth threshold
    #[error("Insufficient data: {found} point(s) at or below threshold, need at least 2")]
    InsufficientData { found: usize },

    #[error("Invalid filter coefficients: {0}")]
    InvalidCoefficients(String),

    #[error("Invalid frequency grid: {0}")]
    InvalidGrid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
