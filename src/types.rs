//! Core types for upload input.
//!
//! An [`ImageFile`] is the in-memory handle handed to an uploader: the
//! file name, its MIME type and the raw bytes. It lives only for the
//! duration of an upload call.

use crate::error::UploadError;
use mime::Mime;
use std::fmt;
use std::path::Path;

/// An image ready to be uploaded
#[derive(Clone, PartialEq)]
pub struct ImageFile {
    name: String,
    mime_type: Mime,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Create an image from bytes already in memory.
    ///
    /// Fails with a configuration error when `mime_type` is not an
    /// `image/*` type.
    pub fn new(
        name: impl Into<String>,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        let name = name.into();
        let mime_type: Mime = mime_type
            .parse()
            .map_err(|_| UploadError::configuration(format!("Invalid MIME type for {}: {}", name, mime_type)))?;

        if mime_type.type_() != mime::IMAGE {
            return Err(UploadError::configuration(format!(
                "{} is not an image file ({})",
                name, mime_type
            )));
        }

        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    /// Read an image from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| UploadError::configuration(format!("Invalid filename: {}", path.display())))?
            .to_string();

        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_for_extension)
            .ok_or_else(|| UploadError::configuration(format!("{} is not an image file", name)))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| UploadError::transport(format!("Failed to read file: {}", e)))?;

        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &Mime {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Multipart part carrying the file bytes, name and content type.
    pub(crate) fn to_part(&self) -> Result<reqwest::multipart::Part, UploadError> {
        reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.name.clone())
            .mime_str(self.mime_type.as_ref())
            .map_err(|e| UploadError::transport(format!("Failed to build request: {}", e)))
    }
}

// Bytes are left out so logs stay readable.
impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type.as_ref())
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// MIME type for a file extension, if it names an image format.
pub fn mime_for_extension(extension: &str) -> Option<Mime> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().ok()?,
        "tif" | "tiff" => "image/tiff".parse().ok()?,
        "avif" => "image/avif".parse().ok()?,
        "ico" => "image/x-icon".parse().ok()?,
        _ => return None,
    };
    Some(mime)
}
