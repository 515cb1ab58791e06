//! Transport abstraction between a consumer and its producer.
//!
//! The transport carries one request (the consumer's cursor) and one reply
//! (an [`UpdateDelta`]). Implementations may use HTTP, RPC or anything else;
//! cancellation and timeouts are theirs to handle.

use std::sync::Arc;

use async_trait::async_trait;

use mirrorsync_core::{UpdateDelta, VersionId};

use crate::error::Result;

/// Request-reply channel to a producer.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport<T>: Send + Sync {
    /// Ask the producer for the delta from `base` to its current collection.
    async fn request_update(&self, base: VersionId) -> Result<UpdateDelta<T>>;
}

#[async_trait]
impl<T, X> Transport<T> for Arc<X>
where
    T: Send + 'static,
    X: Transport<T> + ?Sized,
{
    async fn request_update(&self, base: VersionId) -> Result<UpdateDelta<T>> {
        (**self).request_update(base).await
    }
}

/// In-process transports for embedding and testing.
pub mod memory {
    use super::*;
    use std::hash::Hash;

    use bytes::Bytes;
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use tokio::sync::{mpsc, oneshot};
    use tokio::task::JoinHandle;

    use mirrorsync_core::{decode_delta, encode_delta};

    use crate::error::ChannelError;
    use crate::producer::Producer;
    use crate::source::SnapshotSource;

    /// Calls a producer directly.
    pub struct LocalTransport<T, S> {
        producer: Arc<Producer<T, S>>,
    }

    impl<T, S> LocalTransport<T, S> {
        /// Connect to `producer`.
        pub fn new(producer: Arc<Producer<T, S>>) -> Self {
            Self { producer }
        }

        /// The producer this transport calls.
        pub fn producer(&self) -> &Arc<Producer<T, S>> {
            &self.producer
        }
    }

    impl<T, S> Clone for LocalTransport<T, S> {
        fn clone(&self) -> Self {
            Self {
                producer: Arc::clone(&self.producer),
            }
        }
    }

    #[async_trait]
    impl<T, S> Transport<T> for LocalTransport<T, S>
    where
        T: Clone + Eq + Hash + Send + Sync + 'static,
        S: SnapshotSource<T> + 'static,
    {
        async fn request_update(&self, base: VersionId) -> Result<UpdateDelta<T>> {
            self.producer.request_update(base).await
        }
    }

    /// One pending request on an [`EncodedTransport`].
    struct Request {
        base: VersionId,
        reply: oneshot::Sender<std::result::Result<Bytes, String>>,
    }

    /// Reaches a producer through a served task, CBOR-encoding every delta.
    ///
    /// Producer failures arrive as [`ChannelError::Transport`], the way a
    /// remote error would. Once the serving task stops, requests fail with
    /// [`ChannelError::Closed`].
    pub struct EncodedTransport<T> {
        requests: mpsc::Sender<Request>,
        _marker: std::marker::PhantomData<fn() -> T>,
    }

    impl<T> Clone for EncodedTransport<T> {
        fn clone(&self) -> Self {
            Self {
                requests: self.requests.clone(),
                _marker: std::marker::PhantomData,
            }
        }
    }

    /// Spawn a task answering requests for `producer`.
    ///
    /// The task runs until every [`EncodedTransport`] clone is dropped.
    pub fn serve<T, S>(
        producer: Arc<Producer<T, S>>,
        buffer: usize,
    ) -> (EncodedTransport<T>, JoinHandle<()>)
    where
        T: Clone + Eq + Hash + Serialize + Send + Sync + 'static,
        S: SnapshotSource<T> + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Request>(buffer.max(1));

        let handle = tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let reply = match producer.request_update(request.base).await {
                    Ok(delta) => encode_delta(&delta).map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                // Requester may have given up.
                let _ = request.reply.send(reply);
            }
            tracing::debug!("encoded transport closed");
        });

        let transport = EncodedTransport {
            requests: tx,
            _marker: std::marker::PhantomData,
        };
        (transport, handle)
    }

    #[async_trait]
    impl<T> Transport<T> for EncodedTransport<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        async fn request_update(&self, base: VersionId) -> Result<UpdateDelta<T>> {
            let (reply, response) = oneshot::channel();
            self.requests
                .send(Request { base, reply })
                .await
                .map_err(|_| ChannelError::Closed)?;

            let frame = response
                .await
                .map_err(|_| ChannelError::Closed)?
                .map_err(ChannelError::Transport)?;

            Ok(decode_delta(&frame)?)
        }
    }
}
