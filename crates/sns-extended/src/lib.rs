#![doc = r#"
Extended publisher for size-constrained pub/sub transports.

Payloads larger than the configured threshold are written to a blob store and
replaced on the wire by a pointer record:

```json
{"throughS3":true,"key":"<uuid>"}
```

| Component | Role |
| --- | --- |
| `ExtendedPublisher` | routing decision, blob write, pointer publish |
| `BlobStore` | object write under `(bucket, key)` |
| `Transport` | publish of a body plus message attributes to a destination |
| `MemoryBlobStore` / `MemoryTransport` | in-process backends |
| `FsBlobStore` | directory-per-bucket backend |
| `testing` | failing and delayed backends for error-path tests |

Ordering guarantee: on the offload path the blob write is awaited and checked
before the pointer record is built, so a pointer is never published for an
object that was not written.
"#]

pub mod config;
pub mod fs;
pub mod memory;
pub mod publisher;
pub mod store;
pub mod testing;
pub mod types;

pub use config::{DEFAULT_SIZE_THRESHOLD, ExtendedConfig};
pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryTransport};
pub use publisher::{ExtendedPublisher, PublishError, Published};
pub use store::{
    BlobStore, BlobStoreError, BlobStoreResult, Transport, TransportError, TransportResult,
};
pub use types::{
    AttributeValue, MessageAttributes, PointerRecord, PublishReceipt, PublishRequest,
};
