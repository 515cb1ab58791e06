//! The capability a producer reads the authoritative collection from.

use std::sync::Arc;

use async_trait::async_trait;

/// Supplies a fresh copy of the authoritative collection.
///
/// Called once per delta request, outside every producer lock. It may block
/// on I/O and must do its own locking if the underlying data needs it.
#[async_trait]
pub trait SnapshotSource<T>: Send + Sync {
    /// Return the collection as it is now.
    async fn current_collection(&self) -> anyhow::Result<Vec<T>>;
}

#[async_trait]
impl<T, S> SnapshotSource<T> for Arc<S>
where
    T: 'static,
    S: SnapshotSource<T> + ?Sized,
{
    async fn current_collection(&self) -> anyhow::Result<Vec<T>> {
        (**self).current_collection().await
    }
}

/// Adapts a synchronous closure into a [`SnapshotSource`].
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F> {
    /// Wrap `f`.
    pub fn new<T>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Vec<T>> + Send + Sync,
    {
        Self { f }
    }
}

#[async_trait]
impl<T, F> SnapshotSource<T> for FnSource<F>
where
    T: 'static,
    F: Fn() -> anyhow::Result<Vec<T>> + Send + Sync,
{
    async fn current_collection(&self) -> anyhow::Result<Vec<T>> {
        (self.f)()
    }
}
