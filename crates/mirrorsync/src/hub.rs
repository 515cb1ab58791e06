//! The hub: one producer and the consumers wired to it.

use std::hash::Hash;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;

use mirrorsync_channel::{
    serve, Consumer, EncodedTransport, LocalTransport, Producer, SnapshotSource,
};
use mirrorsync_core::{Differentiator, Equivalence, UpdateDelta, VersionId};

use crate::config::MirrorConfig;
use crate::error::Result;

/// Owns a producer and hands out consumers that agree with it.
///
/// Every consumer created by the hub compares elements with the producer's
/// [`Equivalence`], so both ends of each channel use the same relation.
pub struct SyncHub<T, S> {
    producer: Arc<Producer<T, S>>,
}

impl<T, S> SyncHub<T, S>
where
    T: Clone + Eq + Hash + Send + Sync + 'static,
    S: SnapshotSource<T> + 'static,
{
    /// Create a hub over `source` using natural equality.
    pub fn new(source: S, config: &MirrorConfig) -> Result<Self> {
        Self::with_equivalence(source, config, Equivalence::Natural)
    }

    /// Create a hub over `source` comparing elements with `differentiator`.
    pub fn with_differentiator<D>(source: S, config: &MirrorConfig, differentiator: D) -> Result<Self>
    where
        D: Differentiator<T> + 'static,
    {
        Self::with_equivalence(source, config, Equivalence::custom(differentiator))
    }

    /// Create a hub over `source` comparing elements with `equivalence`.
    pub fn with_equivalence(
        source: S,
        config: &MirrorConfig,
        equivalence: Equivalence<T>,
    ) -> Result<Self> {
        config.validate()?;
        let producer = Producer::new(source, config.retention()).with_equivalence(equivalence);
        Ok(Self::from_producer(producer))
    }

    /// Wrap an already configured producer.
    pub fn from_producer(producer: Producer<T, S>) -> Self {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// The shared producer.
    pub fn producer(&self) -> &Arc<Producer<T, S>> {
        &self.producer
    }

    /// Answer a delta request directly.
    pub async fn request_update(&self, base: VersionId) -> Result<UpdateDelta<T>> {
        Ok(self.producer.request_update(base).await?)
    }

    /// A new consumer calling the producer in-process.
    pub fn subscribe(&self) -> Consumer<T, LocalTransport<T, S>> {
        Consumer::new(LocalTransport::new(Arc::clone(&self.producer)))
            .with_equivalence(self.producer.equivalence().clone())
    }

    /// A new consumer reaching the producer through a served, CBOR-encoded
    /// channel.
    ///
    /// Must be called within a Tokio runtime. The serving task ends when the
    /// consumer is dropped.
    pub fn subscribe_encoded(
        &self,
        buffer: usize,
    ) -> (Consumer<T, EncodedTransport<T>>, JoinHandle<()>)
    where
        T: Serialize + DeserializeOwned,
    {
        let (transport, task) = serve(Arc::clone(&self.producer), buffer);
        let consumer =
            Consumer::new(transport).with_equivalence(self.producer.equivalence().clone());
        tracing::debug!(buffer, "subscribed encoded consumer");
        (consumer, task)
    }
}

impl<T, S> Clone for SyncHub<T, S> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}
