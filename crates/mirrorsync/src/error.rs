//! Error types for the unified API.

use mirrorsync_channel::ChannelError;
use mirrorsync_core::CoreError;
use thiserror::Error;

/// Errors that can occur during mirrorsync operations.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Delta encoding or validation error.
    #[error("delta error: {0}")]
    Core(#[from] CoreError),

    /// Producer, consumer or transport error.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Configuration rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for mirrorsync operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
