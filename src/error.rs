//! Error type shared by every uploader.
//!
//! All failures surface as one [`UploadError`] carrying a display message.
//! The variant tells callers where the failure came from:
//!
//! * [`UploadError::Configuration`] - detected locally before any request
//!   (missing credentials, empty or oversized batch, non-image input)
//! * [`UploadError::Provider`] - the host answered with a failure
//! * [`UploadError::Transport`] - the request never produced a usable answer
//! * [`UploadError::Batch`] - one upload inside a batch failed

use thiserror::Error;

/// Message used when a provider rejects an upload without saying why.
pub const UNKNOWN_PROVIDER_ERROR: &str = "Image upload failed due to an unknown error";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("{0}")]
    Configuration(String),

    #[error("Upload failed: {0}")]
    Provider(String),

    #[error("Upload failed: {0}")]
    Transport(String),

    #[error("Batch upload failed: {0}")]
    Batch(Box<UploadError>),
}

/// Coarse classification of an [`UploadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Provider,
    Transport,
    Batch,
}

impl UploadError {
    pub fn configuration(message: impl Into<String>) -> Self {
        UploadError::Configuration(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        UploadError::Provider(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        UploadError::Transport(message.into())
    }

    /// Wrap a failure that happened inside a batch.
    pub fn batch(inner: UploadError) -> Self {
        UploadError::Batch(Box::new(inner))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Configuration(_) => ErrorKind::Configuration,
            UploadError::Provider(_) => ErrorKind::Provider,
            UploadError::Transport(_) => ErrorKind::Transport,
            UploadError::Batch(_) => ErrorKind::Batch,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, UploadError::Configuration(_))
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, UploadError::Provider(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, UploadError::Transport(_))
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, UploadError::Batch(_))
    }

    /// The failure of the individual upload that sank a batch.
    pub fn batch_cause(&self) -> Option<&UploadError> {
        match self {
            UploadError::Batch(inner) => Some(inner),
            _ => None,
        }
    }
}
