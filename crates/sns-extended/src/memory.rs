use crate::store::{
    BlobStore, BlobStoreError, BlobStoreResult, Transport, TransportError, TransportResult,
};
use crate::types::{PublishReceipt, PublishRequest};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Debug, Default)]
struct MemoryBlobState {
    objects: BTreeMap<(String, String), Vec<u8>>,
    writes: u64,
}

/// In-process blob store. Clones share the same objects.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    inner: Arc<Mutex<MemoryBlobState>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .objects
            .keys()
            .filter(|(object_bucket, _)| object_bucket == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn object_count(&self) -> usize {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.objects.len()
    }

    /// Number of successful `put_object` calls, overwrites included.
    pub fn write_count(&self) -> u64 {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.writes
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> BlobStoreResult<()> {
        if bucket.is_empty() || key.is_empty() {
            return Err(BlobStoreError::InvalidInput(
                "bucket and key must not be empty".to_string(),
            ));
        }
        let mut state = self
            .inner
            .lock()
            .map_err(|_| BlobStoreError::Backend("memory blob store mutex poisoned".to_string()))?;
        state
            .objects
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
        state.writes += 1;
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
struct MemoryTransportState {
    published: Vec<PublishRequest>,
    next_message_id: u64,
}

/// In-process transport that records every publish in call order.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<MemoryTransportState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<PublishRequest> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.published.clone()
    }

    pub fn publish_count(&self) -> usize {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.published.len()
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, request: PublishRequest) -> TransportResult<PublishReceipt> {
        if request.destination.is_empty() {
            return Err(TransportError::InvalidInput(
                "destination must not be empty".to_string(),
            ));
        }
        let mut state = self
            .inner
            .lock()
            .map_err(|_| TransportError::Backend("memory transport mutex poisoned".to_string()))?;
        state.next_message_id += 1;
        let message_id = format!("memory-{}", state.next_message_id);
        state.published.push(request);
        Ok(PublishReceipt {
            message_id: Some(message_id),
        })
    }
}
