use crate::types::{PublishReceipt, PublishRequest};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Object storage addressed by `(bucket, key)`.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `body` verbatim. Returns only once the object is durable from
    /// the backend's point of view.
    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> BlobStoreResult<()>;
}

/// Pub/sub publish call.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Publishes `request.message` to `request.destination` with the request
    /// attributes attached unchanged.
    async fn publish(&self, request: PublishRequest) -> TransportResult<PublishReceipt>;
}

#[async_trait::async_trait]
impl<T> BlobStore for Arc<T>
where
    T: BlobStore + ?Sized,
{
    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> BlobStoreResult<()> {
        (**self).put_object(bucket, key, body).await
    }
}

#[async_trait::async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn publish(&self, request: PublishRequest) -> TransportResult<PublishReceipt> {
        (**self).publish(request).await
    }
}
