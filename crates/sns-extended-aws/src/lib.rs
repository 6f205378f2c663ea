#![doc = r#"
AWS backends for `sns-extended`, built on the official SDK clients.

| Trait | Backend | SDK call |
| --- | --- | --- |
| `BlobStore::put_object` | `S3BlobStore` | `aws_sdk_s3::Client::put_object` |
| `Transport::publish` | `SnsTransport` | `aws_sdk_sns::Client::publish` |

Requests are signed with credentials from the standard `aws-config` provider
chain. The region falls back to `us-east-1` when none is configured.

Endpoint overrides, e.g. for LocalStack:
- `SNS_EXTENDED_S3_ENDPOINT`, falling back to `AWS_ENDPOINT_URL_S3`, then `AWS_ENDPOINT_URL`
- `SNS_EXTENDED_SNS_ENDPOINT`, falling back to `AWS_ENDPOINT_URL_SNS`, then `AWS_ENDPOINT_URL`

S3 switches to path-style addressing whenever an endpoint override is set.
"#]

pub mod s3;
pub mod sdk;
pub mod sns;

pub use s3::S3BlobStore;
pub use sdk::{FALLBACK_REGION, load_sdk_config};
pub use sns::SnsTransport;
