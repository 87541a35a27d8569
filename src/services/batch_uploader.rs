//! Batch upload service
//!
//! Fans one upload per image out against a single host, all in flight at
//! once, and joins them back in input order. The first failure ends the
//! batch; uploads still pending are dropped and no partial list is
//! returned.

use crate::error::UploadError;
use crate::host::ImageHost;
use crate::types::ImageFile;
use futures::future::try_join_all;
use std::sync::Arc;

/// Most images accepted by one batch
pub const MAX_BATCH_SIZE: usize = 10;

/// Service for uploading several images at once
pub struct BatchUploader<H: ImageHost + ?Sized> {
    host: Arc<H>,
}

impl<H: ImageHost + ?Sized> Clone for BatchUploader<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<H: ImageHost + ?Sized> BatchUploader<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Upload every file and return their URLs in the same order.
    ///
    /// Credentials, then an empty list, then an oversized list are rejected
    /// before any request goes out.
    pub async fn execute(&self, files: &[ImageFile]) -> Result<Vec<String>, UploadError> {
        self.host.validate_credentials()?;

        if files.is_empty() {
            return Err(UploadError::configuration("No images to upload"));
        }

        if files.len() > MAX_BATCH_SIZE {
            return Err(UploadError::configuration(format!(
                "Too many images: at most {} can be uploaded at once (got {})",
                MAX_BATCH_SIZE,
                files.len()
            )));
        }

        let total = files.len();
        tracing::info!(
            provider = %self.host.provider(),
            count = total,
            "Uploading {} image(s) concurrently",
            total
        );

        let uploads = files.iter().enumerate().map(|(index, file)| {
            let host = &self.host;
            async move {
                tracing::debug!("[{}/{}] Starting upload of {}", index + 1, total, file.name());
                host.upload(file).await.map_err(|e| {
                    tracing::warn!("[{}/{}] Failed to upload {}: {}", index + 1, total, file.name(), e);
                    e
                })
            }
        });

        let urls = try_join_all(uploads).await.map_err(UploadError::batch)?;

        tracing::info!("Batch upload complete: {} uploaded", urls.len());
        Ok(urls)
    }
}

/// Upload `files` through `host` as one batch.
pub async fn upload_batch<H: ImageHost + ?Sized>(
    host: Arc<H>,
    files: &[ImageFile],
) -> Result<Vec<String>, UploadError> {
    BatchUploader::new(host).execute(files).await
}
