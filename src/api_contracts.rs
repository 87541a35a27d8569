/**
 * API Contract Types for the image hosts
 *
 * These types describe the JSON bodies returned by the ImgBB and Cloudinary
 * upload endpoints. Field names are provider-mandated and must match
 * exactly.
 *
 * Every body is parsed the same way regardless of HTTP status: into an
 * untagged enum, then narrowed into an [`UploadReply`] that is either the
 * uploaded URL or the provider's rejection message.
 */

use serde::{Deserialize, Serialize};

/// Outcome of one upload as reported by the provider body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReply {
    /// The canonical URL of the stored image
    Uploaded(String),
    /// The provider refused the upload; message if it sent one
    Rejected(Option<String>),
}

/// Error details shared by both providers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// ImgBB
// =============================================================================

/// Successful ImgBB upload response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImgbbSuccess {
    pub success: bool,
    pub data: ImgbbImage,
}

/// Image record inside an ImgBB success body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImgbbImage {
    pub url: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub delete_url: Option<String>,
}

/// Failed ImgBB upload response (any body without an image record)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImgbbFailure {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error: Option<ProviderErrorDetail>,
}

/// Discriminated union for ImgBB responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ImgbbResponse {
    Success(ImgbbSuccess),
    Failure(ImgbbFailure),
    Unrecognized(serde_json::Value),
}

impl ImgbbResponse {
    pub fn into_reply(self) -> UploadReply {
        match self {
            ImgbbResponse::Success(s) if s.success => UploadReply::Uploaded(s.data.url),
            ImgbbResponse::Success(_) => UploadReply::Rejected(None),
            ImgbbResponse::Failure(f) => UploadReply::Rejected(f.error.and_then(|e| e.message)),
            ImgbbResponse::Unrecognized(_) => UploadReply::Rejected(None),
        }
    }
}

// =============================================================================
// Cloudinary
// =============================================================================

/// Failed Cloudinary upload response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloudinaryFailure {
    pub error: ProviderErrorDetail,
}

/// Successful Cloudinary upload response (minimal subset)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloudinarySuccess {
    pub secure_url: String,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

/// Discriminated union for Cloudinary responses.
///
/// An `error` field takes precedence over everything else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CloudinaryResponse {
    Failure(CloudinaryFailure),
    Success(CloudinarySuccess),
    Unrecognized(serde_json::Value),
}

impl CloudinaryResponse {
    pub fn into_reply(self) -> UploadReply {
        match self {
            CloudinaryResponse::Failure(f) => UploadReply::Rejected(f.error.message),
            CloudinaryResponse::Success(s) => UploadReply::Uploaded(s.secure_url),
            CloudinaryResponse::Unrecognized(_) => UploadReply::Rejected(None),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
