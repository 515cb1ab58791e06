//! The producer: answers delta requests against its snapshot history.

use std::hash::Hash;
use std::sync::Arc;

use mirrorsync_core::{
    compute_changes, Differentiator, Equivalence, UpdateDelta, VersionId, VersionMinter,
};
use mirrorsync_history::{Clock, RetentionPolicy, Snapshot, SnapshotHistory};

use crate::error::{ChannelError, Result};
use crate::source::SnapshotSource;

/// Owns the authoritative side of a channel.
///
/// Each [`request_update`](Self::request_update) captures a fresh snapshot,
/// mints a version for it, and returns the delta from the caller's baseline.
/// Safe to call concurrently from any number of tasks.
pub struct Producer<T, S> {
    /// Where collections come from.
    source: S,
    /// Version id source. Shared when several producers must not reuse ids.
    minter: Arc<VersionMinter>,
    /// Recent snapshots.
    history: SnapshotHistory<T>,
    /// Equality used to diff snapshots.
    equivalence: Equivalence<T>,
}

impl<T, S> Producer<T, S>
where
    T: Clone + Eq + Hash + Send + Sync,
    S: SnapshotSource<T>,
{
    /// Create a producer over `source` with the given retention.
    pub fn new(source: S, retention: RetentionPolicy) -> Self {
        Self {
            source,
            minter: Arc::new(VersionMinter::new()),
            history: SnapshotHistory::new(retention),
            equivalence: Equivalence::Natural,
        }
    }

    /// Diff with `differentiator` instead of natural equality.
    pub fn with_differentiator<D>(self, differentiator: D) -> Self
    where
        D: Differentiator<T> + 'static,
    {
        self.with_equivalence(Equivalence::custom(differentiator))
    }

    /// Diff with `equivalence`.
    pub fn with_equivalence(mut self, equivalence: Equivalence<T>) -> Self {
        self.equivalence = equivalence;
        self
    }

    /// Mint versions from a shared minter.
    pub fn with_minter(mut self, minter: Arc<VersionMinter>) -> Self {
        self.minter = minter;
        self
    }

    /// Timestamp snapshots with `clock`. Discards any retained history.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        let retention = self.history.retention();
        self.history = SnapshotHistory::with_clock(retention, clock);
        self
    }

    /// Compute the delta from `base` to the current collection.
    ///
    /// If `base` is [`NO_VERSION`](mirrorsync_core::NO_VERSION) or no longer
    /// in history, the delta is a rebase carrying the whole collection. A
    /// source failure is returned before any version is minted or any
    /// history entry touched.
    pub async fn request_update(&self, base: VersionId) -> Result<UpdateDelta<T>> {
        let items = self.source.current_collection().await.map_err(|e| {
            tracing::warn!(%base, error = %e, "snapshot source failed");
            ChannelError::Source(e)
        })?;

        let version = self.minter.mint();
        let captured_at = self.history.now();

        let delta = match self.history.lookup(base) {
            Some(baseline) => {
                let changes = compute_changes(baseline.items(), &items, &self.equivalence);
                UpdateDelta::incremental(base, version, changes)
            }
            None => UpdateDelta::rebase(version, items.clone()),
        };

        self.history
            .insert(Snapshot::new(version, captured_at, items));

        tracing::debug!(
            %base,
            %version,
            rebase = delta.is_rebase(),
            added = delta.added.len(),
            removed = delta.removed.len(),
            "produced delta"
        );
        Ok(delta)
    }

    /// Versions currently held in history, eldest first.
    pub fn retained_versions(&self) -> Vec<VersionId> {
        self.history.versions()
    }

    /// Number of snapshots held in history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The most recently minted version.
    pub fn last_minted(&self) -> VersionId {
        self.minter.last()
    }

    /// The active retention policy.
    pub fn retention(&self) -> RetentionPolicy {
        self.history.retention()
    }

    /// Change retention at runtime. Takes effect from the next request.
    pub fn set_retention(&self, retention: RetentionPolicy) {
        self.history.set_retention(retention);
    }

    /// The equality used to diff snapshots.
    pub fn equivalence(&self) -> &Equivalence<T> {
        &self.equivalence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mirrorsync_core::{KeyDifferentiator, NO_VERSION};
    use mirrorsync_history::{BaselineMode, ManualClock};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves a fixed script of collections, then repeats the last one.
    struct Script {
        steps: Mutex<Vec<anyhow::Result<Vec<u32>>>>,
    }

    impl Script {
        fn new(steps: Vec<anyhow::Result<Vec<u32>>>) -> Self {
            let mut steps = steps;
            steps.reverse();
            Self {
                steps: Mutex::new(steps),
            }
        }

        fn ok(steps: &[&[u32]]) -> Self {
            Self::new(steps.iter().map(|s| Ok(s.to_vec())).collect())
        }
    }

    #[async_trait]
    impl SnapshotSource<u32> for Script {
        async fn current_collection(&self) -> anyhow::Result<Vec<u32>> {
            let mut steps = self.steps.lock().unwrap();
            match steps.len() {
                0 => anyhow::bail!("script exhausted"),
                1 => match &steps[0] {
                    Ok(items) => Ok(items.clone()),
                    Err(e) => Err(anyhow::anyhow!("{e}")),
                },
                _ => steps.pop().unwrap(),
            }
        }
    }

    fn sorted(mut items: Vec<u32>) -> Vec<u32> {
        items.sort();
        items
    }

    #[tokio::test]
    async fn test_chained_scenario_with_count_bound() {
        let producer = Producer::new(
            Script::ok(&[&[1, 2], &[1, 2, 3], &[2, 3], &[2, 3, 4]]),
            RetentionPolicy::unbounded().with_max_versions(2),
        );

        let d1 = producer.request_update(NO_VERSION).await.unwrap();
        assert_eq!(d1.result_version, VersionId(1));
        assert!(d1.is_rebase());
        assert_eq!(sorted(d1.added), vec![1, 2]);

        let d2 = producer.request_update(d1.result_version).await.unwrap();
        assert_eq!(d2.base_version, VersionId(1));
        assert_eq!(d2.result_version, VersionId(2));
        assert_eq!(d2.added, vec![3]);
        assert!(d2.removed.is_empty());

        let d3 = producer.request_update(d2.result_version).await.unwrap();
        assert_eq!(d3.result_version, VersionId(3));
        assert!(d3.added.is_empty());
        assert_eq!(d3.removed, vec![1]);

        let d4 = producer.request_update(d3.result_version).await.unwrap();
        assert_eq!(d4.result_version, VersionId(4));
        assert_eq!(d4.added, vec![4]);
        assert!(d4.removed.is_empty());

        // Each chained call consumed its baseline.
        assert_eq!(producer.retained_versions(), vec![VersionId(4)]);
        assert_eq!(producer.last_minted(), VersionId(4));
    }

    #[tokio::test]
    async fn test_keep_mode_retains_two_most_recent() {
        let producer = Producer::new(
            Script::ok(&[&[1, 2], &[1, 2, 3], &[2, 3], &[2, 3, 4]]),
            RetentionPolicy::unbounded()
                .with_max_versions(2)
                .with_baseline(BaselineMode::Keep),
        );

        let mut cursor = NO_VERSION;
        for _ in 0..4 {
            cursor = producer.request_update(cursor).await.unwrap().result_version;
        }
        assert_eq!(producer.retained_versions(), vec![VersionId(3), VersionId(4)]);
    }

    #[tokio::test]
    async fn test_unknown_base_rebases() {
        let producer = Producer::new(Script::ok(&[&[7, 8]]), RetentionPolicy::default());

        let delta = producer.request_update(VersionId(12345)).await.unwrap();
        assert!(delta.is_rebase());
        assert_eq!(delta.base_version, NO_VERSION);
        assert_eq!(sorted(delta.added), vec![7, 8]);
        assert!(delta.removed.is_empty());
    }

    #[tokio::test]
    async fn test_evicted_base_rebases() {
        let producer = Producer::new(
            Script::ok(&[&[1], &[1, 2], &[1, 2, 3]]),
            RetentionPolicy::unbounded().with_max_versions(1),
        );

        let first = producer.request_update(NO_VERSION).await.unwrap();
        // A second, unrelated caller pushes `first` out of history.
        producer.request_update(NO_VERSION).await.unwrap();

        let stale = producer.request_update(first.result_version).await.unwrap();
        assert!(stale.is_rebase());
        assert_eq!(sorted(stale.added), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_age_eviction() {
        let clock = Arc::new(ManualClock::new());
        let producer = Producer::new(
            Script::ok(&[&[1], &[1], &[1]]),
            RetentionPolicy::unbounded().with_max_age(Duration::from_secs(60)),
        )
        .with_clock(clock.clone());

        let first = producer.request_update(NO_VERSION).await.unwrap();
        clock.advance(Duration::from_secs(61));
        // Inserting the second snapshot evicts the first by age.
        producer.request_update(NO_VERSION).await.unwrap();

        let stale = producer.request_update(first.result_version).await.unwrap();
        assert!(stale.is_rebase());
    }

    #[tokio::test]
    async fn test_source_failure_leaves_state_untouched() {
        let producer = Producer::new(
            Script::new(vec![
                Ok(vec![1]),
                Err(anyhow::anyhow!("backend unavailable")),
                Ok(vec![1, 2]),
            ]),
            RetentionPolicy::default(),
        );

        let first = producer.request_update(NO_VERSION).await.unwrap();
        let err = producer.request_update(first.result_version).await.unwrap_err();
        assert!(matches!(err, ChannelError::Source(_)));
        assert_eq!(producer.last_minted(), VersionId(1));
        assert_eq!(producer.retained_versions(), vec![VersionId(1)]);

        // The baseline survived the failure.
        let next = producer.request_update(first.result_version).await.unwrap();
        assert_eq!(next.base_version, VersionId(1));
        assert_eq!(next.result_version, VersionId(2));
        assert_eq!(next.added, vec![2]);
    }

    #[tokio::test]
    async fn test_shared_minter_across_producers() {
        let minter = Arc::new(VersionMinter::new());
        let a = Producer::new(Script::ok(&[&[1]]), RetentionPolicy::default())
            .with_minter(minter.clone());
        let b = Producer::new(Script::ok(&[&[2]]), RetentionPolicy::default())
            .with_minter(minter.clone());

        let va = a.request_update(NO_VERSION).await.unwrap().result_version;
        let vb = b.request_update(NO_VERSION).await.unwrap().result_version;
        assert_ne!(va, vb);
        assert_eq!(minter.last(), VersionId(2));
    }

    #[tokio::test]
    async fn test_minting_skips_sentinel_on_wrap() {
        let producer = Producer::new(Script::ok(&[&[1]]), RetentionPolicy::default())
            .with_minter(Arc::new(VersionMinter::starting_after(-1)));

        let delta = producer.request_update(NO_VERSION).await.unwrap();
        assert_eq!(delta.result_version, VersionId(1));
    }

    #[tokio::test]
    async fn test_differentiator_diff() {
        struct Pairs(Mutex<Vec<Vec<(u32, u32)>>>);

        #[async_trait]
        impl SnapshotSource<(u32, u32)> for Pairs {
            async fn current_collection(&self) -> anyhow::Result<Vec<(u32, u32)>> {
                Ok(self.0.lock().unwrap().remove(0))
            }
        }

        let producer = Producer::new(
            Pairs(Mutex::new(vec![vec![(1, 0), (2, 0)], vec![(1, 1), (3, 0)]])),
            RetentionPolicy::default(),
        )
        .with_differentiator(KeyDifferentiator::new(|p: &(u32, u32)| p.0));

        let first = producer.request_update(NO_VERSION).await.unwrap();
        let second = producer.request_update(first.result_version).await.unwrap();
        assert_eq!(second.added, vec![(3, 0)]);
        assert_eq!(second.removed, vec![(2, 0)]);
        assert!(!producer.equivalence().is_natural());
    }

    #[tokio::test]
    async fn test_set_retention_at_runtime() {
        let producer = Producer::new(Script::ok(&[&[1]]), RetentionPolicy::unbounded());
        for _ in 0..3 {
            producer.request_update(NO_VERSION).await.unwrap();
        }
        assert_eq!(producer.history_len(), 3);

        producer.set_retention(RetentionPolicy::unbounded().with_max_versions(1));
        assert_eq!(producer.retention().max_versions, 1);

        // One eviction per request: the table stays over its bound.
        producer.request_update(NO_VERSION).await.unwrap();
        assert_eq!(producer.history_len(), 3);
    }

    proptest! {
        #[test]
        fn test_versions_unique_and_never_sentinel(
            start in any::<i32>(),
            picks in prop::collection::vec(0usize..4, 1..40),
            max_versions in 0usize..5,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let producer = Producer::new(
                    Script::ok(&[&[1, 2, 3]]),
                    RetentionPolicy::unbounded().with_max_versions(max_versions),
                )
                .with_minter(Arc::new(VersionMinter::starting_after(start)));

                let mut minted = Vec::new();
                let mut seen = HashSet::new();
                for pick in picks {
                    let base = minted.iter().rev().nth(pick).copied().unwrap_or(NO_VERSION);
                    let delta = producer.request_update(base).await.unwrap();
                    assert!(!delta.result_version.is_sentinel());
                    assert!(seen.insert(delta.result_version));
                    minted.push(delta.result_version);

                    let retained = producer.retained_versions();
                    let unique: HashSet<_> = retained.iter().collect();
                    assert_eq!(unique.len(), retained.len());
                    if max_versions > 0 {
                        assert!(retained.len() <= max_versions);
                    }
                }
            });
        }
    }
}
