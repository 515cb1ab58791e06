//! Test fixtures and helpers.
//!
//! Sources, transports and element types for setting up channel scenarios.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use mirrorsync_channel::{ChannelError, Result, SnapshotSource, Transport};
use mirrorsync_core::{KeyDifferentiator, UpdateDelta, VersionId};

/// A collection the test mutates between requests.
///
/// Clones share the same collection.
pub struct SharedSource<T> {
    items: Arc<RwLock<Vec<T>>>,
    calls: Arc<AtomicUsize>,
}

impl<T: Clone> SharedSource<T> {
    /// Start with `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the collection.
    pub fn set(&self, items: Vec<T>) {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
    }

    /// Mutate the collection in place.
    pub fn update(&self, f: impl FnOnce(&mut Vec<T>)) {
        f(&mut self.items.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// Copy of the collection.
    pub fn get(&self) -> Vec<T> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times a producer asked for the collection.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T> Clone for SharedSource<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T: Clone> Default for SharedSource<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl<T> SnapshotSource<T> for SharedSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn current_collection(&self) -> anyhow::Result<Vec<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.get())
    }
}

/// Replays a fixed sequence of collections.
///
/// `None` steps fail. After the script runs out the last step repeats.
pub struct ScriptedSource<T> {
    steps: Vec<Option<Vec<T>>>,
    next: AtomicUsize,
}

impl<T> ScriptedSource<T> {
    /// Script with failures.
    pub fn new(steps: Vec<Option<Vec<T>>>) -> Self {
        Self {
            steps,
            next: AtomicUsize::new(0),
        }
    }

    /// Script that always succeeds.
    pub fn ok(steps: Vec<Vec<T>>) -> Self {
        Self::new(steps.into_iter().map(Some).collect())
    }

    /// How many steps have been served, failures included.
    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> SnapshotSource<T> for ScriptedSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn current_collection(&self) -> anyhow::Result<Vec<T>> {
        let step = self.next.fetch_add(1, Ordering::SeqCst);
        match self.steps.get(step).or_else(|| self.steps.last()) {
            Some(Some(items)) => Ok(items.clone()),
            Some(None) => anyhow::bail!("scripted failure at step {step}"),
            None => anyhow::bail!("empty script"),
        }
    }
}

/// Wraps a transport and fails a chosen number of upcoming requests.
pub struct FlakyTransport<X> {
    inner: X,
    failures: AtomicUsize,
}

impl<X> FlakyTransport<X> {
    /// Wrap `inner`; no failures pending.
    pub fn new(inner: X) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(0),
        }
    }

    /// Fail the next `n` requests without reaching the producer.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &X {
        &self.inner
    }
}

#[async_trait]
impl<T, X> Transport<T> for FlakyTransport<X>
where
    T: Send + 'static,
    X: Transport<T>,
{
    async fn request_update(&self, base: VersionId) -> Result<UpdateDelta<T>> {
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(ChannelError::Transport(format!(
                "injected failure for base {base}"
            )));
        }
        self.inner.request_update(base).await
    }
}

/// An element with a stable identity and a mutable revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyedItem {
    pub id: u32,
    pub revision: u32,
}

impl KeyedItem {
    pub fn new(id: u32, revision: u32) -> Self {
        Self { id, revision }
    }

    /// Same id, next revision.
    pub fn bumped(self) -> Self {
        Self {
            revision: self.revision.wrapping_add(1),
            ..self
        }
    }
}

/// Key extractor type for [`by_id`].
pub type ById = KeyDifferentiator<KeyedItem, u32, fn(&KeyedItem) -> u32>;

/// Differentiator treating [`KeyedItem`]s with the same id as the same.
pub fn by_id() -> ById {
    let key: fn(&KeyedItem) -> u32 = |item| item.id;
    KeyDifferentiator::new(key)
}

/// Deterministic RNG for reproducible churn.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Randomly evolve `current`: drop each element with probability `rate`,
/// then add about `rate * len` fresh elements drawn from `0..universe`.
///
/// The result has no duplicates.
pub fn churn<R: Rng>(rng: &mut R, current: &[u32], universe: u32, rate: f64) -> Vec<u32> {
    let rate = rate.clamp(0.0, 1.0);
    let mut next: Vec<u32> = current
        .iter()
        .copied()
        .filter(|_| !rng.gen_bool(rate))
        .collect();
    let mut present: HashSet<u32> = next.iter().copied().collect();

    let additions = ((current.len().max(1) as f64) * rate).ceil() as usize;
    for _ in 0..additions {
        let candidate = rng.gen_range(0..universe.max(1));
        if present.insert(candidate) {
            next.push(candidate);
        }
    }
    next
}
