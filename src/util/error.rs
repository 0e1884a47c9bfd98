//! Error types for the denoiser library.

use thiserror::Error;

/// Main error type for denoiser operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration parameter outside its allowed range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Auxiliary buffers of one frame disagree on resolution
    #[error("Dimension mismatch for {buffer}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        buffer: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Transform table is missing the camera matrices
    #[error("Transform table too short: {count} matrices, need at least 2 (world-to-camera, world-to-screen)")]
    MissingMatrices { count: usize },
}

impl Error {
    /// Create an invalid-configuration error from a string.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type alias for denoiser operations.
pub type Result<T> = std::result::Result<T, Error>;
