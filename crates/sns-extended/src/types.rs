use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type MessageAttributes = BTreeMap<String, AttributeValue>;

/// Message attribute in the SNS shape: a data type plus either a string or a
/// binary value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeValue {
    pub data_type: String,
    pub string_value: Option<String>,
    pub binary_value: Option<Vec<u8>>,
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::with_data_type("String", value)
    }

    pub fn number(value: impl ToString) -> Self {
        Self::with_data_type("Number", value.to_string())
    }

    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self {
            data_type: "Binary".to_string(),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }

    /// String-carried value with a custom data type such as `String.Array`
    /// or `Number.float`.
    pub fn with_data_type(data_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishRequest {
    pub destination: String,
    pub message: String,
    pub attributes: MessageAttributes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishReceipt {
    pub message_id: Option<String>,
}

/// Body published in place of an offloaded payload.
///
/// Field names and order are a wire contract shared with subscribers:
/// `{"throughS3":true,"key":"..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerRecord {
    #[serde(rename = "throughS3")]
    pub through_s3: bool,
    pub key: String,
}

impl PointerRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            through_s3: true,
            key: key.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
