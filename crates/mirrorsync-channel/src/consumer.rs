//! The consumer: keeps a local mirror of a producer's collection.

use std::hash::Hash;

use tokio::sync::Mutex;

use mirrorsync_core::{
    apply_changes, compute_changes, Changes, Differentiator, Equivalence, VersionId, NO_VERSION,
};

use crate::error::{ChannelError, Result};
use crate::transport::Transport;

/// What one [`Consumer::sync`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome<T> {
    /// Elements added to the mirror.
    pub added: Vec<T>,
    /// Elements removed from the mirror.
    pub removed: Vec<T>,
    /// Cursor before the sync.
    pub base_version: VersionId,
    /// Cursor after the sync.
    pub version: VersionId,
    /// The producer had lost our baseline and sent the full collection.
    pub rebased: bool,
}

impl<T> SyncOutcome<T> {
    /// Check if the mirror was left unchanged.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// The outcome as a [`Changes`] pair.
    pub fn into_changes(self) -> Changes<T> {
        Changes {
            added: self.added,
            removed: self.removed,
        }
    }
}

struct MirrorState<T> {
    cursor: VersionId,
    mirror: Vec<T>,
}

/// Mirrors a producer's collection through a [`Transport`].
///
/// The configured [`Equivalence`] is used both to diff a rebase against the
/// mirror and to locate removed elements in it. It should match the
/// producer's.
///
/// The mirror tracks membership, not multiplicity. A rebase whose full
/// collection repeats an element already mirrored once adds nothing.
pub struct Consumer<T, X> {
    transport: X,
    equivalence: Equivalence<T>,
    state: Mutex<MirrorState<T>>,
}

impl<T, X> Consumer<T, X>
where
    T: Clone + Eq + Hash + Send + Sync,
    X: Transport<T>,
{
    /// Create a consumer with an empty mirror and no cursor.
    pub fn new(transport: X) -> Self {
        Self {
            transport,
            equivalence: Equivalence::Natural,
            state: Mutex::new(MirrorState {
                cursor: NO_VERSION,
                mirror: Vec::new(),
            }),
        }
    }

    /// Compare elements with `differentiator`.
    pub fn with_differentiator<D>(self, differentiator: D) -> Self
    where
        D: Differentiator<T> + 'static,
    {
        self.with_equivalence(Equivalence::custom(differentiator))
    }

    /// Compare elements with `equivalence`.
    pub fn with_equivalence(mut self, equivalence: Equivalence<T>) -> Self {
        self.equivalence = equivalence;
        self
    }

    /// Fetch one delta and apply it to the mirror.
    ///
    /// Concurrent calls are serialized. On any error the mirror and cursor
    /// are left as they were.
    pub async fn sync(&self) -> Result<SyncOutcome<T>> {
        let mut state = self.state.lock().await;
        let cursor = state.cursor;

        let delta = self.transport.request_update(cursor).await.map_err(|e| {
            tracing::warn!(%cursor, error = %e, "update request failed");
            e
        })?;
        delta.validate()?;

        let base = delta.base_version;
        let version = delta.result_version;

        let (changes, rebased) = if !cursor.is_sentinel() && base == cursor {
            (delta.into_changes(), false)
        } else if base.is_sentinel() && !cursor.is_sentinel() {
            // Baseline gone: `added` is the full collection.
            (compute_changes(&state.mirror, &delta.added, &self.equivalence), true)
        } else if base.is_sentinel() {
            (delta.into_changes(), false)
        } else {
            tracing::warn!(%cursor, %base, "delta base does not match cursor");
            return Err(ChannelError::BaseMismatch { cursor, base });
        };

        apply_changes(&mut state.mirror, &changes, &self.equivalence);
        state.cursor = version;

        tracing::debug!(
            base = %cursor,
            %version,
            rebased,
            added = changes.added.len(),
            removed = changes.removed.len(),
            mirrored = state.mirror.len(),
            "applied delta"
        );

        Ok(SyncOutcome {
            added: changes.added,
            removed: changes.removed,
            base_version: cursor,
            version,
            rebased,
        })
    }

    /// Sync, then project the same changes onto `target`.
    pub async fn sync_into(&self, target: &mut Vec<T>) -> Result<SyncOutcome<T>> {
        let outcome = self.sync().await?;
        let changes = Changes {
            added: outcome.added.clone(),
            removed: outcome.removed.clone(),
        };
        apply_changes(target, &changes, &self.equivalence);
        Ok(outcome)
    }

    /// Version the mirror is synced to.
    pub async fn cursor(&self) -> VersionId {
        self.state.lock().await.cursor
    }

    /// Copy of the mirror.
    pub async fn mirror(&self) -> Vec<T> {
        self.state.lock().await.mirror.clone()
    }

    /// Number of mirrored elements.
    pub async fn len(&self) -> usize {
        self.state.lock().await.mirror.len()
    }

    /// Check if the mirror is empty.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.mirror.is_empty()
    }

    /// Drop the mirror and cursor; the next sync starts from scratch.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.cursor = NO_VERSION;
        state.mirror.clear();
    }

    /// The transport in use.
    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// The equality used against the mirror.
    pub fn equivalence(&self) -> &Equivalence<T> {
        &self.equivalence
    }
}
