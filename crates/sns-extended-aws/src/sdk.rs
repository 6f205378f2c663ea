use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Region used when neither the environment nor a profile names one.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Service error codes that mean the caller addressed something that does not
/// exist or sent a malformed request.
const CALLER_ERROR_CODES: &[&str] = &[
    "NoSuchBucket",
    "InvalidBucketName",
    "NotFound",
    "InvalidParameter",
    "InvalidParameterValue",
];

/// Loads credentials and region through the standard provider chain
/// (environment, shared profile, container and instance metadata).
/// `endpoint_url` overrides the service endpoint, e.g. for LocalStack.
pub async fn load_sdk_config(endpoint_url: Option<&str>) -> SdkConfig {
    let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
    if let Some(url) = endpoint_url {
        loader = loader.endpoint_url(url);
    }
    loader.load().await
}

/// First non-blank value among `names`.
pub(crate) fn endpoint_from_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .filter(|value| !value.trim().is_empty())
    })
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Failure {
    InvalidInput(String),
    Backend(String),
}

pub(crate) fn classify<E>(error: &SdkError<E, HttpResponse>) -> Failure
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match error {
        SdkError::ConstructionFailure(_) => {
            Failure::InvalidInput(DisplayErrorContext(error).to_string())
        }
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            classify_service(
                Some(context.raw().status().as_u16()),
                service_error.code(),
                service_error.message(),
            )
        }
        _ => Failure::Backend(DisplayErrorContext(error).to_string()),
    }
}

pub(crate) fn classify_service(
    status: Option<u16>,
    code: Option<&str>,
    message: Option<&str>,
) -> Failure {
    let detail = match (code, message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => "unrecognized service error".to_string(),
    };
    let caller_error = matches!(status, Some(400 | 404))
        || code.is_some_and(|code| CALLER_ERROR_CODES.contains(&code));
    let detail = match status {
        Some(status) => format!("status {status}: {detail}"),
        None => detail,
    };
    if caller_error {
        Failure::InvalidInput(detail)
    } else {
        Failure::Backend(detail)
    }
}
