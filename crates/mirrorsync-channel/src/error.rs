//! Error types for the channel module.

use thiserror::Error;

use mirrorsync_core::{CoreError, VersionId};

/// Errors that can occur while producing or consuming deltas.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The snapshot source could not provide the collection.
    #[error("snapshot source failed: {0}")]
    Source(anyhow::Error),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(String),

    /// A delta failed to encode, decode or validate.
    #[error("delta error: {0}")]
    Core(#[from] CoreError),

    /// The producer answered for a baseline the consumer does not hold.
    #[error("delta base {base} does not match consumer cursor {cursor}")]
    BaseMismatch { cursor: VersionId, base: VersionId },

    /// The peer is gone.
    #[error("channel closed")]
    Closed,
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
