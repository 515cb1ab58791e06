//! # mirrorsync Core
//!
//! Pure primitives for versioned collection synchronization: version ids,
//! update deltas, identity relations, and set difference.
//!
//! This crate contains no I/O, no storage, no networking. The only shared
//! state is the atomic [`VersionMinter`].
//!
//! ## Key Types
//!
//! - [`VersionId`] - 32-bit version identifier with the [`NO_VERSION`] sentinel
//! - [`VersionMinter`] - Atomic, wrapping, sentinel-skipping id source
//! - [`UpdateDelta`] - Change between two versions (or a full rebase)
//! - [`Differentiator`] - Pluggable identity relation over elements
//! - [`Equivalence`] - Natural equality or a configured differentiator
//! - [`DeltaFilter`] - Strips suppressed elements from a delta
//!
//! ## Wire Format
//!
//! Deltas crossing a remote boundary are encoded as CBOR. See [`codec`].

pub mod codec;
pub mod delta;
pub mod diff;
pub mod differentiator;
pub mod error;
pub mod filter;
pub mod version;

pub use codec::{decode_delta, encode_delta};
pub use delta::UpdateDelta;
pub use diff::{apply_changes, compute_changes, Changes};
pub use differentiator::{Differentiator, Equivalence, KeyDifferentiator};
pub use error::{CoreError, Result};
pub use filter::{suppress, DeltaFilter};
pub use version::{VersionId, VersionMinter, NO_VERSION};
