//! Backends for exercising publisher error paths.

use crate::store::{
    BlobStore, BlobStoreError, BlobStoreResult, Transport, TransportError, TransportResult,
};
use crate::types::{PublishReceipt, PublishRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Blob store whose writes always fail with `BlobStoreError::Backend`.
#[derive(Clone, Debug)]
pub struct FailingBlobStore {
    message: String,
    attempts: Arc<AtomicU64>,
}

impl FailingBlobStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BlobStore for FailingBlobStore {
    async fn put_object(&self, _bucket: &str, _key: &str, _body: &[u8]) -> BlobStoreResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BlobStoreError::Backend(self.message.clone()))
    }
}

/// Transport whose publishes always fail with `TransportError::Backend`.
#[derive(Clone, Debug)]
pub struct FailingTransport {
    message: String,
    attempts: Arc<AtomicU64>,
}

impl FailingTransport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for FailingTransport {
    async fn publish(&self, _request: PublishRequest) -> TransportResult<PublishReceipt> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Backend(self.message.clone()))
    }
}

/// Sleeps for `delay` before delegating to the wrapped store.
#[derive(Clone, Debug)]
pub struct DelayedBlobStore<S> {
    inner: S,
    delay: Duration,
}

impl<S> DelayedBlobStore<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait::async_trait]
impl<S: BlobStore> BlobStore for DelayedBlobStore<S> {
    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> BlobStoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.put_object(bucket, key, body).await
    }
}

/// Sleeps for `delay` before delegating to the wrapped transport.
#[derive(Clone, Debug)]
pub struct DelayedTransport<T> {
    inner: T,
    delay: Duration,
}

impl<T> DelayedTransport<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait::async_trait]
impl<T: Transport> Transport for DelayedTransport<T> {
    async fn publish(&self, request: PublishRequest) -> TransportResult<PublishReceipt> {
        tokio::time::sleep(self.delay).await;
        self.inner.publish(request).await
    }
}
