//! # mirrorsync Channel
//!
//! The two ends of a collection channel and the transport between them.
//!
//! ## Overview
//!
//! A [`Producer`] owns the authoritative side. Each request captures the
//! current collection from a [`SnapshotSource`], mints a version, and
//! answers with the delta from the caller's baseline, or with a full rebase
//! if that baseline has left history.
//!
//! A [`Consumer`] owns a local mirror and a cursor. Each [`Consumer::sync`]
//! sends the cursor through a [`Transport`], applies the reply, and reports
//! what changed.
//!
//! ## Key Properties
//!
//! - **No partial state**: a failed source call mints nothing; a failed
//!   transport call leaves the mirror and cursor untouched
//! - **Serialized consumers**: one sync at a time per consumer
//! - **Concurrent producers**: any number of requests may run at once
//! - **Self-healing**: a stale cursor yields a rebase, never an error
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mirrorsync_channel::{Consumer, FnSource, LocalTransport, Producer};
//! use mirrorsync_history::RetentionPolicy;
//!
//! async fn example() -> mirrorsync_channel::Result<()> {
//!     let source = FnSource::new(|| -> anyhow::Result<Vec<u32>> { Ok(vec![1, 2, 3]) });
//!     let producer: Arc<Producer<u32, _>> =
//!         Arc::new(Producer::new(source, RetentionPolicy::default()));
//!
//!     let consumer = Consumer::new(LocalTransport::new(producer));
//!     let outcome = consumer.sync().await?;
//!     println!("added {:?}, removed {:?}", outcome.added, outcome.removed);
//!     Ok(())
//! }
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! Consumer                            Producer
//!   |-------- request_update(cursor) -->|
//!   |                                   |-- current_collection()
//!   |                                   |-- mint, diff, insert, evict
//!   |<------- UpdateDelta --------------|
//!   |-- apply to mirror, advance cursor |
//! ```

pub mod consumer;
pub mod error;
pub mod producer;
pub mod source;
pub mod transport;

pub use consumer::{Consumer, SyncOutcome};
pub use error::{ChannelError, Result};
pub use producer::Producer;
pub use source::{FnSource, SnapshotSource};
pub use transport::{
    memory::serve, memory::EncodedTransport, memory::LocalTransport, Transport,
};
