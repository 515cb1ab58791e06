//! # mirrorsync
//!
//! The unified API for mirrorsync: keep remote mirrors of a collection
//! current by exchanging versioned deltas.
//!
//! ## Overview
//!
//! mirrorsync provides:
//!
//! - **Versions**: Every request mints a fresh 32-bit version id
//! - **Snapshot history**: Recent captures kept under age and count bounds
//! - **Deltas**: Added/removed elements against the caller's baseline, or a
//!   full rebase when that baseline is gone
//! - **Mirrors**: Consumers that apply deltas and report what changed
//!
//! ## Key Concepts
//!
//! - **Snapshot**: Immutable, versioned capture of the collection.
//! - **Rebase**: A delta with the `NO_VERSION` base carrying the whole
//!   collection; the consumer diffs it against its mirror.
//! - **Differentiator**: An identity relation that replaces equality, e.g.
//!   matching records by id. Both ends of a channel must agree on it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mirrorsync::{MirrorConfig, SyncHub};
//! use mirrorsync::channel::FnSource;
//!
//! async fn example() -> mirrorsync::Result<()> {
//!     let config = MirrorConfig::from_json(r#"{ "max_versions": 50 }"#)?;
//!     let source = FnSource::new(|| -> anyhow::Result<Vec<String>> {
//!         Ok(vec!["alpha".into(), "beta".into()])
//!     });
//!
//!     let hub: SyncHub<String, _> = SyncHub::new(source, &config)?;
//!     let consumer = hub.subscribe();
//!
//!     let outcome = consumer.sync().await?;
//!     println!("now at {}, added {:?}", outcome.version, outcome.added);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `mirrorsync::core` - Versions, deltas, differentiators, set difference
//! - `mirrorsync::history` - Snapshot history and retention
//! - `mirrorsync::channel` - Producer, consumer and transports

pub mod config;
pub mod error;
pub mod hub;

// Re-export component crates
pub use mirrorsync_channel as channel;
pub use mirrorsync_core as core;
pub use mirrorsync_history as history;

// Re-export main types for convenience
pub use config::MirrorConfig;
pub use error::{MirrorError, Result};
pub use hub::SyncHub;

// Re-export commonly used component types
pub use mirrorsync_channel::{
    ChannelError, Consumer, FnSource, LocalTransport, Producer, SnapshotSource, SyncOutcome,
    Transport,
};
pub use mirrorsync_core::{
    Differentiator, Equivalence, KeyDifferentiator, UpdateDelta, VersionId, NO_VERSION,
};
pub use mirrorsync_history::{BaselineMode, EvictionMode, RetentionPolicy};
