//! Provider credentials and uploader configuration.
//!
//! Credentials are plain values owned by the caller and handed to an
//! uploader when it is built. They can be assembled in code, read from the
//! process environment, or loaded from `config.json` in the app's config
//! directory (environment wins).

use crate::config_utils;
use crate::error::UploadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// How a Cloudinary request signature is derived from the secret
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningPolicy {
    /// `SHA1(string_to_sign + secret)`
    #[default]
    Sha1,
    /// `HMAC-SHA1(secret, string_to_sign)`
    HmacSha1,
}

impl SigningPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha1" => Some(SigningPolicy::Sha1),
            "hmac_sha1" | "hmac-sha1" | "hmac" => Some(SigningPolicy::HmacSha1),
            _ => None,
        }
    }
}

/// ImgBB credentials
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ImgbbCredentials {
    pub api_key: String,
    /// Auto-delete the image after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_secs: Option<u64>,
}

impl ImgbbCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            expiration_secs: None,
        }
    }
}

impl fmt::Debug for ImgbbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImgbbCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

/// How Cloudinary uploads are authorized
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CloudinaryAuth {
    Signed {
        api_key: String,
        api_secret: String,
        #[serde(default)]
        signing: SigningPolicy,
    },
    Preset {
        upload_preset: String,
    },
}

impl fmt::Debug for CloudinaryAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudinaryAuth::Signed { api_key, signing, .. } => f
                .debug_struct("Signed")
                .field("api_key", &redact(api_key))
                .field("api_secret", &"<redacted>")
                .field("signing", signing)
                .finish(),
            CloudinaryAuth::Preset { upload_preset } => f
                .debug_struct("Preset")
                .field("upload_preset", upload_preset)
                .finish(),
        }
    }
}

/// Cloudinary credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    #[serde(flatten)]
    pub auth: CloudinaryAuth,
    /// Destination folder inside the media library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl CloudinaryCredentials {
    pub fn signed(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            auth: CloudinaryAuth::Signed {
                api_key: api_key.into(),
                api_secret: api_secret.into(),
                signing: SigningPolicy::default(),
            },
            folder: None,
        }
    }

    pub fn preset(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            auth: CloudinaryAuth::Preset {
                upload_preset: upload_preset.into(),
            },
            folder: None,
        }
    }
}

/// Which host to upload to, with its credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderConfig {
    Imgbb(ImgbbCredentials),
    Cloudinary(CloudinaryCredentials),
}

/// Everything needed to build an uploader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploaderConfig {
    #[serde(flatten)]
    pub provider: ProviderConfig,
    /// Override the provider's API origin (e.g. `http://127.0.0.1:1234`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request timeout; unset means requests may wait indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl UploaderConfig {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            base_url: None,
            request_timeout_secs: None,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Load configuration: process environment first, then the config file.
    pub fn load() -> Result<Self, UploadError> {
        if let Some(config) = Self::from_env() {
            tracing::debug!("Using uploader configuration from environment");
            return Ok(config);
        }

        match config_utils::load_config_file::<UploaderConfig>(CONFIG_FILE_NAME)? {
            Some(config) => {
                tracing::debug!("Using uploader configuration from config file");
                Ok(config)
            }
            None => Err(UploadError::configuration(
                "No uploader credentials configured: set IMGBB_API_KEY or CLOUDINARY_CLOUD_NAME, or create a config file",
            )),
        }
    }

    /// Persist this configuration to the app's config file.
    pub fn save(&self) -> Result<std::path::PathBuf, UploadError> {
        config_utils::save_config_file(CONFIG_FILE_NAME, self)
    }

    /// Build configuration from the process environment, if any provider
    /// variables are present.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Values are not validated here; uploaders reject empty credentials at
    /// call time.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider_hint = lookup("IMAGE_UPLOADER_PROVIDER").map(|p| p.trim().to_ascii_lowercase());

        let imgbb = || {
            lookup("IMGBB_API_KEY").map(|api_key| {
                ProviderConfig::Imgbb(ImgbbCredentials {
                    api_key,
                    expiration_secs: lookup("IMGBB_EXPIRATION").and_then(|v| v.trim().parse().ok()),
                })
            })
        };

        let cloudinary = || {
            lookup("CLOUDINARY_CLOUD_NAME").map(|cloud_name| {
                let auth = match lookup("CLOUDINARY_UPLOAD_PRESET") {
                    Some(upload_preset) if lookup("CLOUDINARY_API_SECRET").is_none() => {
                        CloudinaryAuth::Preset { upload_preset }
                    }
                    _ => CloudinaryAuth::Signed {
                        api_key: lookup("CLOUDINARY_API_KEY").unwrap_or_default(),
                        api_secret: lookup("CLOUDINARY_API_SECRET").unwrap_or_default(),
                        signing: lookup("CLOUDINARY_SIGNING")
                            .and_then(|v| SigningPolicy::parse(&v))
                            .unwrap_or_default(),
                    },
                };
                ProviderConfig::Cloudinary(CloudinaryCredentials {
                    cloud_name,
                    auth,
                    folder: lookup("CLOUDINARY_FOLDER"),
                })
            })
        };

        let provider = match provider_hint.as_deref() {
            Some("imgbb") => imgbb(),
            Some("cloudinary") => cloudinary(),
            _ => imgbb().or_else(cloudinary),
        }?;

        Some(Self {
            provider,
            base_url: lookup("IMAGE_UPLOADER_BASE_URL"),
            request_timeout_secs: lookup("IMAGE_UPLOADER_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()),
        })
    }
}

fn redact(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    if value.chars().count() > 4 {
        format!("{}...", visible)
    } else {
        "<redacted>".to_string()
    }
}
