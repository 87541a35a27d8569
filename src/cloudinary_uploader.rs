use crate::api_contracts::CloudinaryResponse;
use crate::credentials::{CloudinaryAuth, CloudinaryCredentials};
use crate::error::UploadError;
use crate::host::{build_client, require_credential, send_upload, ImageHost, Provider};
use crate::signing;
use crate::types::ImageFile;
use async_trait::async_trait;
use std::time::Duration;

pub const CLOUDINARY_API_URL: &str = "https://api.cloudinary.com";

/// API client for Cloudinary uploads, signed or preset-based
pub struct CloudinaryUploader {
    base_url: String,
    credentials: CloudinaryCredentials,
    client: reqwest::Client,
}

impl CloudinaryUploader {
    /// Create an uploader against the public Cloudinary API
    pub fn new(credentials: CloudinaryCredentials) -> Self {
        Self::with_base_url(CLOUDINARY_API_URL.to_string(), credentials)
    }

    /// Create an uploader against a different API origin
    pub fn with_base_url(base_url: String, credentials: CloudinaryCredentials) -> Self {
        Self::with_timeout(base_url, credentials, None)
    }

    pub fn with_timeout(
        base_url: String,
        credentials: CloudinaryCredentials,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client: build_client(timeout),
        }
    }

    /// Get URL for the image upload endpoint of the configured cloud.
    ///
    /// The cloud name is a single path segment, percent-encoded.
    fn upload_url(&self) -> Result<reqwest::Url, UploadError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| UploadError::transport(format!("Invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| UploadError::transport(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v1_1", self.credentials.cloud_name.trim(), "image", "upload"]);

        Ok(url)
    }

    /// Text fields sent next to the file.
    ///
    /// For signed uploads `timestamp` is both signed and sent, so the pair
    /// always agrees.
    fn form_fields(&self, timestamp: i64) -> Result<Vec<(&'static str, String)>, UploadError> {
        let folder = self.credentials.folder.as_deref().filter(|f| !f.trim().is_empty());
        let mut fields = Vec::new();

        match &self.credentials.auth {
            CloudinaryAuth::Signed {
                api_key,
                api_secret,
                signing: policy,
            } => {
                let signature = signing::sign_upload(timestamp, folder, api_secret, *policy)?;
                fields.push(("api_key", api_key.clone()));
                fields.push(("timestamp", timestamp.to_string()));
                fields.push(("signature", signature));
            }
            CloudinaryAuth::Preset { upload_preset } => {
                fields.push(("upload_preset", upload_preset.clone()));
            }
        }

        if let Some(folder) = folder {
            fields.push(("folder", folder.to_string()));
        }

        Ok(fields)
    }
}

#[async_trait]
impl ImageHost for CloudinaryUploader {
    fn provider(&self) -> Provider {
        Provider::Cloudinary
    }

    fn validate_credentials(&self) -> Result<(), UploadError> {
        require_credential(&self.credentials.cloud_name, "Cloudinary cloud name")?;
        match &self.credentials.auth {
            CloudinaryAuth::Signed {
                api_key, api_secret, ..
            } => {
                require_credential(api_key, "Cloudinary API key")?;
                require_credential(api_secret, "Cloudinary API secret")
            }
            CloudinaryAuth::Preset { upload_preset } => {
                require_credential(upload_preset, "Cloudinary upload preset")
            }
        }
    }

    async fn upload(&self, file: &ImageFile) -> Result<String, UploadError> {
        self.validate_credentials()?;

        let timestamp = signing::unix_timestamp();
        let mut form = reqwest::multipart::Form::new().part("file", file.to_part()?);
        for (name, value) in self.form_fields(timestamp)? {
            form = form.text(name, value);
        }

        tracing::info!(
            filename = file.name(),
            size = file.len(),
            cloud = %self.credentials.cloud_name,
            "Uploading image to Cloudinary"
        );

        let request = self.client.post(self.upload_url()?).multipart(form);
        let image_url = send_upload(request, CloudinaryResponse::into_reply).await?;

        tracing::info!(filename = file.name(), url = %image_url, "Upload complete");
        Ok(image_url)
    }
}
