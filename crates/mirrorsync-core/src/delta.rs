//! The update delta exchanged between producer and consumer.

use serde::{Deserialize, Serialize};

use crate::diff::Changes;
use crate::error::{CoreError, Result};
use crate::version::{VersionId, NO_VERSION};

/// The change between two versions of a collection.
///
/// Two shapes share this struct:
///
/// - **Incremental**: `base_version` is the version the caller asked about;
///   `added` and `removed` are the difference to `result_version`.
/// - **Rebase**: `base_version` is [`NO_VERSION`]; `added` holds the entire
///   collection at `result_version` and `removed` is empty. The caller must
///   treat it as a full replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDelta<T> {
    /// Version the delta applies on top of, or [`NO_VERSION`] for a rebase.
    pub base_version: VersionId,
    /// Version the caller holds after applying the delta. Never [`NO_VERSION`].
    pub result_version: VersionId,
    /// Elements added, taken from the newer snapshot.
    pub added: Vec<T>,
    /// Elements removed, taken from the older snapshot.
    pub removed: Vec<T>,
}

impl<T> UpdateDelta<T> {
    /// Create an incremental delta.
    pub fn incremental(
        base_version: VersionId,
        result_version: VersionId,
        changes: Changes<T>,
    ) -> Self {
        Self {
            base_version,
            result_version,
            added: changes.added,
            removed: changes.removed,
        }
    }

    /// Create a rebase delta carrying the full collection.
    pub fn rebase(result_version: VersionId, full: Vec<T>) -> Self {
        Self {
            base_version: NO_VERSION,
            result_version,
            added: full,
            removed: Vec::new(),
        }
    }

    /// Check if this is a full-replacement delta.
    pub fn is_rebase(&self) -> bool {
        self.base_version.is_sentinel()
    }

    /// Check if the delta carries no elements.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Check structural invariants.
    ///
    /// Rejects a [`NO_VERSION`] result and a rebase that carries removals.
    pub fn validate(&self) -> Result<()> {
        if self.result_version.is_sentinel() {
            return Err(CoreError::InvalidDelta(
                "result version is the no-version sentinel".into(),
            ));
        }
        if self.is_rebase() && !self.removed.is_empty() {
            return Err(CoreError::InvalidDelta(format!(
                "rebase delta to {} carries {} removals",
                self.result_version,
                self.removed.len()
            )));
        }
        Ok(())
    }

    /// Split into added and removed elements.
    pub fn into_changes(self) -> Changes<T> {
        Changes {
            added: self.added,
            removed: self.removed,
        }
    }
}
