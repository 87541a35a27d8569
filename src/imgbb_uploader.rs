use crate::api_contracts::ImgbbResponse;
use crate::credentials::ImgbbCredentials;
use crate::error::UploadError;
use crate::host::{build_client, require_credential, send_upload, ImageHost, Provider};
use crate::types::ImageFile;
use async_trait::async_trait;
use std::time::Duration;

pub const IMGBB_API_URL: &str = "https://api.imgbb.com";

/// API client for ImgBB uploads (API key sent in the query string)
pub struct ImgbbUploader {
    base_url: String,
    credentials: ImgbbCredentials,
    client: reqwest::Client,
}

impl ImgbbUploader {
    /// Create an uploader against the public ImgBB API
    pub fn new(credentials: ImgbbCredentials) -> Self {
        Self::with_base_url(IMGBB_API_URL.to_string(), credentials)
    }

    /// Create an uploader against a different API origin
    pub fn with_base_url(base_url: String, credentials: ImgbbCredentials) -> Self {
        Self::with_timeout(base_url, credentials, None)
    }

    pub fn with_timeout(
        base_url: String,
        credentials: ImgbbCredentials,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client: build_client(timeout),
        }
    }

    /// Get URL for the upload endpoint
    fn upload_url(&self) -> String {
        format!("{}/1/upload", self.base_url)
    }

    /// Upload URL with the key (and optional expiration) in the query string
    fn request_url(&self) -> Result<reqwest::Url, UploadError> {
        let mut url = reqwest::Url::parse(&self.upload_url())
            .map_err(|e| UploadError::transport(format!("Invalid base URL: {}", e)))?;

        {
            let mut query_pairs = url.query_pairs_mut();
            query_pairs.append_pair("key", &self.credentials.api_key);
            if let Some(expiration) = self.credentials.expiration_secs {
                query_pairs.append_pair("expiration", &expiration.to_string());
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl ImageHost for ImgbbUploader {
    fn provider(&self) -> Provider {
        Provider::Imgbb
    }

    fn validate_credentials(&self) -> Result<(), UploadError> {
        require_credential(&self.credentials.api_key, "ImgBB API key")
    }

    async fn upload(&self, file: &ImageFile) -> Result<String, UploadError> {
        self.validate_credentials()?;

        let url = self.request_url()?;
        let form = reqwest::multipart::Form::new().part("image", file.to_part()?);

        tracing::info!(filename = file.name(), size = file.len(), "Uploading image to ImgBB");

        let request = self.client.post(url).multipart(form);
        let image_url = send_upload(request, ImgbbResponse::into_reply).await?;

        tracing::info!(filename = file.name(), url = %image_url, "Upload complete");
        Ok(image_url)
    }
}
