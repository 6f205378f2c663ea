use crate::config::ExtendedConfig;
use crate::store::{BlobStore, BlobStoreError, Transport, TransportError};
use crate::types::{MessageAttributes, PointerRecord, PublishReceipt, PublishRequest};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("storage write failed for {bucket}/{key}: {source}")]
    StorageWriteFailed {
        bucket: String,
        key: String,
        #[source]
        source: BlobStoreError,
    },

    #[error("publish to {destination} failed: {source}")]
    PublishFailed {
        destination: String,
        #[source]
        source: TransportError,
    },

    #[error("pointer record serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Path a published message took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Published {
    Inline {
        message_id: Option<String>,
    },
    Offloaded {
        key: String,
        message_id: Option<String>,
    },
}

impl Published {
    /// Blob-store key when the payload was offloaded.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Inline { .. } => None,
            Self::Offloaded { key, .. } => Some(key),
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Inline { message_id } | Self::Offloaded { message_id, .. } => {
                message_id.as_deref()
            }
        }
    }
}

/// Publishes through `T`, redirecting oversized payloads through `S`.
#[derive(Clone, Debug)]
pub struct ExtendedPublisher<S, T> {
    config: ExtendedConfig,
    store: S,
    transport: T,
}

impl<S, T> ExtendedPublisher<S, T> {
    pub fn new(config: ExtendedConfig, store: S, transport: T) -> Result<Self, PublishError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            transport,
        })
    }

    pub fn config(&self) -> &ExtendedConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Byte length is compared, so multi-byte text offloads earlier than its
    /// character count suggests. A message exactly at the threshold stays
    /// inline.
    pub fn requires_offload(&self, message: &str) -> bool {
        self.config.always_through_s3 || message.len() as u64 > self.config.size_threshold
    }
}

impl<S, T> ExtendedPublisher<S, T>
where
    S: BlobStore,
    T: Transport,
{
    pub async fn publish(
        &self,
        message: &str,
        destination: &str,
        attributes: MessageAttributes,
    ) -> Result<Published, PublishError> {
        let bytes = message.len();
        if !self.requires_offload(message) {
            tracing::debug!(
                destination = %destination,
                bytes,
                threshold = self.config.size_threshold,
                "publishing inline"
            );
            let receipt = self
                .send(destination, message.to_string(), attributes)
                .await?;
            return Ok(Published::Inline {
                message_id: receipt.message_id,
            });
        }

        let key = Uuid::new_v4().to_string();
        self.write_payload(&key, message).await?;
        tracing::info!(
            destination = %destination,
            bucket = %self.config.bucket,
            key = %key,
            bytes,
            forced = self.config.always_through_s3,
            "payload offloaded"
        );

        let pointer = PointerRecord::new(key.clone()).to_json()?;
        let receipt = self.send(destination, pointer, attributes).await?;
        Ok(Published::Offloaded {
            key,
            message_id: receipt.message_id,
        })
    }

    async fn write_payload(&self, key: &str, message: &str) -> Result<(), PublishError> {
        let bucket = self.config.bucket.as_str();
        bounded(
            self.config.storage_timeout(),
            self.store.put_object(bucket, key, message.as_bytes()),
            |after_ms| BlobStoreError::Timeout { after_ms },
        )
        .await
        .map_err(|source| {
            tracing::warn!(bucket = %bucket, key = %key, error = %source, "blob write failed");
            PublishError::StorageWriteFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            }
        })
    }

    async fn send(
        &self,
        destination: &str,
        message: String,
        attributes: MessageAttributes,
    ) -> Result<PublishReceipt, PublishError> {
        let request = PublishRequest {
            destination: destination.to_string(),
            message,
            attributes,
        };
        bounded(
            self.config.publish_timeout(),
            self.transport.publish(request),
            |after_ms| TransportError::Timeout { after_ms },
        )
        .await
        .map_err(|source| {
            tracing::warn!(destination = %destination, error = %source, "publish failed");
            PublishError::PublishFailed {
                destination: destination.to_string(),
                source,
            }
        })
    }
}

async fn bounded<R, E, F>(
    limit: Option<Duration>,
    operation: F,
    timed_out: impl FnOnce(u64) -> E,
) -> Result<R, E>
where
    F: Future<Output = Result<R, E>>,
{
    let Some(limit) = limit else {
        return operation.await;
    };
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(timed_out(limit.as_millis().min(u64::MAX as u128) as u64)),
    }
}
