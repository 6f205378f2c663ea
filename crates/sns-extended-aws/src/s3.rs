use crate::sdk::{Failure, classify, endpoint_from_env, load_sdk_config};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use sns_extended::{BlobStore, BlobStoreError, BlobStoreResult};

/// Blob store backed by `PutObject` through the AWS SDK.
#[derive(Clone, Debug)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Emulators such as LocalStack need `force_path_style`.
    pub fn from_sdk_config(config: &SdkConfig, force_path_style: bool) -> Self {
        let config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(force_path_style)
            .build();
        Self::new(aws_sdk_s3::Client::from_conf(config))
    }

    /// Standard credential chain; path-style addressing when an endpoint
    /// override is given.
    pub async fn connect(endpoint_url: Option<&str>) -> Self {
        let config = load_sdk_config(endpoint_url).await;
        Self::from_sdk_config(&config, endpoint_url.is_some())
    }

    pub async fn from_env() -> Self {
        let endpoint = endpoint_from_env(&[
            "SNS_EXTENDED_S3_ENDPOINT",
            "AWS_ENDPOINT_URL_S3",
            "AWS_ENDPOINT_URL",
        ]);
        Self::connect(endpoint.as_deref()).await
    }

    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> BlobStoreResult<()> {
        if bucket.is_empty() || key.is_empty() {
            return Err(BlobStoreError::InvalidInput(
                "bucket and key must not be empty".to_string(),
            ));
        }
        tracing::debug!(bucket = %bucket, key = %key, bytes = body.len(), "s3 put object");

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/octet-stream")
            .body(ByteStream::from(body.to_vec()))
            .send()
            .await
            .map_err(|err| map_put_error(&err))?;
        Ok(())
    }
}

fn map_put_error(error: &SdkError<PutObjectError, HttpResponse>) -> BlobStoreError {
    match classify(error) {
        Failure::InvalidInput(detail) => BlobStoreError::InvalidInput(detail),
        Failure::Backend(detail) => BlobStoreError::Backend(format!("s3 put_object failed: {detail}")),
    }
}
