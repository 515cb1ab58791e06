//! # mirrorsync History
//!
//! The producer's table of recent snapshots.
//!
//! ## Overview
//!
//! Every delta request captures a [`Snapshot`] of the authoritative
//! collection and files it under its freshly minted version id. A later
//! request naming that version as its baseline looks the snapshot up and
//! diffs against it. Snapshots that age out or overflow the table are
//! evicted; a request whose baseline is gone gets a full rebase instead.
//!
//! ## Key Types
//!
//! - [`Snapshot`] - Immutable, versioned capture of a collection
//! - [`SnapshotHistory`] - Ordered, internally locked table of snapshots
//! - [`RetentionPolicy`] - Age/count bounds and eviction mode
//! - [`Clock`] - Time source, swappable for tests
//!
//! ## Design Notes
//!
//! - **Explicit ordering**: entries are ordered by insertion slot, not by
//!   version id, so wrapped ids still evict oldest-first.
//! - **Soft bound**: by default one eviction check per insert. A burst of
//!   inserts or a lowered bound is caught up by later inserts.
//! - **Individually atomic steps**: lookup and insert-with-eviction each
//!   take the table lock once; a producer request is not atomic as a whole.

pub mod clock;
pub mod history;
pub mod retention;
pub mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use history::SnapshotHistory;
pub use retention::{BaselineMode, EvictionMode, RetentionPolicy};
pub use snapshot::Snapshot;
