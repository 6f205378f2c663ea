use crate::publisher::PublishError;
use serde::Deserialize;
use std::time::Duration;

/// SNS rejects message bodies above 256 KiB.
pub const DEFAULT_SIZE_THRESHOLD: u64 = 262_144;

/// Publisher configuration. Fixed once the publisher is built.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtendedConfig {
    /// Largest message, in UTF-8 bytes, published inline.
    #[serde(alias = "sizeThreshold")]
    pub size_threshold: u64,
    pub bucket: String,
    #[serde(alias = "alwaysThroughS3")]
    pub always_through_s3: bool,
    #[serde(alias = "storageTimeoutMs")]
    pub storage_timeout_ms: Option<u64>,
    #[serde(alias = "publishTimeoutMs")]
    pub publish_timeout_ms: Option<u64>,
}

impl Default for ExtendedConfig {
    fn default() -> Self {
        Self {
            size_threshold: DEFAULT_SIZE_THRESHOLD,
            bucket: String::new(),
            always_through_s3: false,
            storage_timeout_ms: None,
            publish_timeout_ms: None,
        }
    }
}

impl ExtendedConfig {
    pub fn new(size_threshold: u64, bucket: impl Into<String>) -> Self {
        Self {
            size_threshold,
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn with_always_through_s3(mut self, always_through_s3: bool) -> Self {
        self.always_through_s3 = always_through_s3;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout_ms = Some(duration_ms(timeout));
        self
    }

    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout_ms = Some(duration_ms(timeout));
        self
    }

    pub fn storage_timeout(&self) -> Option<Duration> {
        self.storage_timeout_ms.map(Duration::from_millis)
    }

    pub fn publish_timeout(&self) -> Option<Duration> {
        self.publish_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), PublishError> {
        if self.bucket.trim().is_empty() {
            return Err(PublishError::InvalidConfig(
                "bucket must not be empty".to_string(),
            ));
        }
        if self.storage_timeout_ms == Some(0) {
            return Err(PublishError::InvalidConfig(
                "storage_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.publish_timeout_ms == Some(0) {
            return Err(PublishError::InvalidConfig(
                "publish_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Whole milliseconds; a non-zero duration under 1 ms counts as 1 ms.
fn duration_ms(duration: Duration) -> u64 {
    let millis = duration.as_millis().min(u64::MAX as u128) as u64;
    if millis == 0 && !duration.is_zero() {
        1
    } else {
        millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_config_defaults_match_sns_limit() {
        let config = ExtendedConfig::default();
        assert_eq!(config.size_threshold, 262_144);
        assert!(!config.always_through_s3);
        assert_eq!(config.storage_timeout(), None);
        assert_eq!(config.publish_timeout(), None);
    }

    #[test]
    fn extended_config_deserializes_camel_case_names() {
        let config: ExtendedConfig = serde_json::from_str(
            r#"{"sizeThreshold":100,"bucket":"payloads","alwaysThroughS3":true}"#,
        )
        .expect("config should deserialize");
        assert_eq!(config.size_threshold, 100);
        assert_eq!(config.bucket, "payloads");
        assert!(config.always_through_s3);
    }

    #[test]
    fn extended_config_missing_fields_fall_back_to_defaults() {
        let config: ExtendedConfig =
            serde_json::from_str(r#"{"bucket":"payloads","publish_timeout_ms":1500}"#)
                .expect("config should deserialize");
        assert_eq!(config.size_threshold, DEFAULT_SIZE_THRESHOLD);
        assert_eq!(config.publish_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn validate_rejects_blank_bucket_and_zero_timeouts() {
        assert!(matches!(
            ExtendedConfig::new(10, "  ").validate(),
            Err(PublishError::InvalidConfig(_))
        ));
        assert!(matches!(
            ExtendedConfig::new(10, "b")
                .with_storage_timeout(Duration::ZERO)
                .validate(),
            Err(PublishError::InvalidConfig(_))
        ));
        assert!(matches!(
            ExtendedConfig::new(10, "b")
                .with_publish_timeout(Duration::ZERO)
                .validate(),
            Err(PublishError::InvalidConfig(_))
        ));
        assert!(ExtendedConfig::new(10, "b").validate().is_ok());
    }

    #[test]
    fn sub_millisecond_timeouts_round_up_to_one_ms() {
        let config = ExtendedConfig::new(10, "b")
            .with_storage_timeout(Duration::from_micros(500))
            .with_publish_timeout(Duration::from_nanos(1));
        assert_eq!(config.storage_timeout_ms, Some(1));
        assert_eq!(config.publish_timeout_ms, Some(1));
        assert!(config.validate().is_ok());

        let config = ExtendedConfig::new(10, "b").with_storage_timeout(Duration::from_micros(1500));
        assert_eq!(config.storage_timeout_ms, Some(1));
    }
}
