//! Request signing for authenticated Cloudinary uploads.
//!
//! The parameters to sign are sorted by name and joined as `k=v&k=v`.
//! Under [`SigningPolicy::Sha1`] the secret is appended and the whole string
//! is hashed; under [`SigningPolicy::HmacSha1`] the secret keys an HMAC over
//! the string. Either way the digest is lowercase hex.

use crate::credentials::SigningPolicy;
use crate::error::UploadError;
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

type HmacSha1 = Hmac<Sha1>;

/// Current Unix time in whole seconds.
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// `k=v` pairs sorted by key and joined with `&`.
pub fn string_to_sign(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign a parameter set with the shared secret.
pub fn sign_params(
    params: &BTreeMap<&str, String>,
    secret: &str,
    policy: SigningPolicy,
) -> Result<String, UploadError> {
    let payload = string_to_sign(params);
    match policy {
        SigningPolicy::Sha1 => Ok(sha1_hex(&format!("{}{}", payload, secret))),
        SigningPolicy::HmacSha1 => hmac_sha1_hex(secret, &payload),
    }
}

/// Signature for an upload issued at `timestamp`, optionally into `folder`.
pub fn sign_upload(
    timestamp: i64,
    folder: Option<&str>,
    secret: &str,
    policy: SigningPolicy,
) -> Result<String, UploadError> {
    let mut params = BTreeMap::new();
    params.insert("timestamp", timestamp.to_string());
    if let Some(folder) = folder {
        params.insert("folder", folder.to_string());
    }
    sign_params(&params, secret, policy)
}

fn sha1_hex(message: &str) -> String {
    hex::encode(Sha1::digest(message.as_bytes()))
}

fn hmac_sha1_hex(key: &str, message: &str) -> Result<String, UploadError> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| UploadError::transport(format!("Failed to compute signature: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
