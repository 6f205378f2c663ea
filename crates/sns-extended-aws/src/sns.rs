use crate::sdk::{Failure, classify, endpoint_from_env, load_sdk_config};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::config::http::HttpResponse;
use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sns::primitives::Blob;
use aws_sdk_sns::types::MessageAttributeValue;
use sns_extended::{
    MessageAttributes, PublishReceipt, PublishRequest, Transport, TransportError, TransportResult,
};
use std::collections::HashMap;

/// Transport backed by SNS `Publish` through the AWS SDK.
#[derive(Clone, Debug)]
pub struct SnsTransport {
    client: aws_sdk_sns::Client,
}

impl SnsTransport {
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_sns::Client::new(config))
    }

    pub async fn connect(endpoint_url: Option<&str>) -> Self {
        Self::from_sdk_config(&load_sdk_config(endpoint_url).await)
    }

    pub async fn from_env() -> Self {
        let endpoint = endpoint_from_env(&[
            "SNS_EXTENDED_SNS_ENDPOINT",
            "AWS_ENDPOINT_URL_SNS",
            "AWS_ENDPOINT_URL",
        ]);
        Self::connect(endpoint.as_deref()).await
    }

    pub fn client(&self) -> &aws_sdk_sns::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for SnsTransport {
    async fn publish(&self, request: PublishRequest) -> TransportResult<PublishReceipt> {
        if request.destination.is_empty() {
            return Err(TransportError::InvalidInput(
                "topic arn must not be empty".to_string(),
            ));
        }
        let attributes = message_attributes(&request.attributes)?;
        tracing::debug!(
            topic_arn = %request.destination,
            bytes = request.message.len(),
            attributes = attributes.len(),
            "sns publish"
        );

        let output = self
            .client
            .publish()
            .topic_arn(request.destination)
            .message(request.message)
            .set_message_attributes((!attributes.is_empty()).then_some(attributes))
            .send()
            .await
            .map_err(|err| map_publish_error(&err))?;

        Ok(PublishReceipt {
            message_id: output.message_id().map(str::to_string),
        })
    }
}

/// SDK attribute map for `attributes`. Values are copied as given; the SDK
/// base64-encodes binary values on the wire.
pub fn message_attributes(
    attributes: &MessageAttributes,
) -> TransportResult<HashMap<String, MessageAttributeValue>> {
    attributes
        .iter()
        .map(|(name, value)| {
            let converted = MessageAttributeValue::builder()
                .data_type(&value.data_type)
                .set_string_value(value.string_value.clone())
                .set_binary_value(value.binary_value.clone().map(Blob::new))
                .build()
                .map_err(|err| {
                    TransportError::InvalidInput(format!("message attribute {name}: {err}"))
                })?;
            Ok((name.clone(), converted))
        })
        .collect()
}

fn map_publish_error(error: &SdkError<PublishError, HttpResponse>) -> TransportError {
    match classify(error) {
        Failure::InvalidInput(detail) => TransportError::InvalidInput(detail),
        Failure::Backend(detail) => TransportError::Backend(format!("sns publish failed: {detail}")),
    }
}
