//! The seam between upload orchestration and concrete image hosts.

use crate::api_contracts::UploadReply;
use crate::credentials::{ProviderConfig, UploaderConfig};
use crate::error::{UploadError, UNKNOWN_PROVIDER_ERROR};
use crate::types::ImageFile;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Supported image hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Imgbb,
    Cloudinary,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Imgbb => write!(f, "ImgBB"),
            Provider::Cloudinary => write!(f, "Cloudinary"),
        }
    }
}

/// A host that turns one image into one shareable URL
#[async_trait]
pub trait ImageHost: Send + Sync {
    fn provider(&self) -> Provider;

    /// Check credentials without touching the network.
    fn validate_credentials(&self) -> Result<(), UploadError>;

    /// Upload a single image and return its URL.
    async fn upload(&self, file: &ImageFile) -> Result<String, UploadError>;
}

/// Build the uploader selected by `config`.
pub fn build_uploader(config: &UploaderConfig) -> Result<Arc<dyn ImageHost>, UploadError> {
    let timeout = config.request_timeout();
    match &config.provider {
        #[cfg(feature = "imgbb")]
        ProviderConfig::Imgbb(credentials) => {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| crate::imgbb_uploader::IMGBB_API_URL.to_string());
            Ok(Arc::new(crate::imgbb_uploader::ImgbbUploader::with_timeout(
                base_url,
                credentials.clone(),
                timeout,
            )))
        }
        #[cfg(not(feature = "imgbb"))]
        ProviderConfig::Imgbb(_) => Err(UploadError::configuration(
            "ImgBB support is not enabled in this build",
        )),
        #[cfg(feature = "cloudinary")]
        ProviderConfig::Cloudinary(credentials) => {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| crate::cloudinary_uploader::CLOUDINARY_API_URL.to_string());
            Ok(Arc::new(crate::cloudinary_uploader::CloudinaryUploader::with_timeout(
                base_url,
                credentials.clone(),
                timeout,
            )))
        }
        #[cfg(not(feature = "cloudinary"))]
        ProviderConfig::Cloudinary(_) => Err(UploadError::configuration(
            "Cloudinary support is not enabled in this build",
        )),
    }
}

/// Fail with a configuration error when `value` is blank.
pub(crate) fn require_credential(value: &str, description: &str) -> Result<(), UploadError> {
    if value.trim().is_empty() {
        return Err(UploadError::configuration(format!("{} is not set", description)));
    }
    Ok(())
}

/// HTTP client shared by the uploaders.
pub(crate) fn build_client(timeout: Option<Duration>) -> reqwest::Client {
    // Include version in User-Agent header for tracking
    let version = env!("CARGO_PKG_VERSION");
    let user_agent = format!("ImageLinkUploader/{}", version);

    let mut builder = reqwest::Client::builder().user_agent(&user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Send a prepared request and narrow the body into a URL.
///
/// The body is parsed as JSON whatever the status. A non-success status or
/// a rejecting body becomes a provider error; anything that stops us from
/// getting a parsed body becomes a transport error.
pub(crate) async fn send_upload<R, F>(
    request: reqwest::RequestBuilder,
    into_reply: F,
) -> Result<String, UploadError>
where
    R: DeserializeOwned,
    F: FnOnce(R) -> UploadReply,
{
    let response = request
        .send()
        .await
        .map_err(|e| UploadError::transport(format!("Network error: {}", e)))?;

    let status = response.status();
    let body: R = response
        .json()
        .await
        .map_err(|e| UploadError::transport(format!("Failed to parse response: {}", e)))?;

    match into_reply(body) {
        UploadReply::Uploaded(url) if status.is_success() => Ok(url),
        UploadReply::Uploaded(_) => {
            tracing::warn!(%status, "Provider returned a URL with a failure status");
            Err(UploadError::provider(UNKNOWN_PROVIDER_ERROR))
        }
        UploadReply::Rejected(message) => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_PROVIDER_ERROR.to_string());
            tracing::warn!(%status, error = %message, "Provider rejected upload");
            Err(UploadError::provider(message))
        }
    }
}
