//! Error types for mirrorsync core.

use thiserror::Error;

/// Errors that can occur while encoding, decoding or validating deltas.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("invalid delta: {0}")]
    InvalidDelta(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
