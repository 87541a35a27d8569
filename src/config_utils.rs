//! Configuration file utilities
//!
//! Provides helper functions for reading and writing uploader configuration
//! files. Config files are stored in the platform-specific config directory
//! under "image-link-uploader/".

use crate::error::UploadError;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "image-link-uploader";

/// Get the app's config directory path.
///
/// Returns: `~/.config/image-link-uploader` (Linux)
///          `~/Library/Application Support/image-link-uploader` (macOS)
///          `C:\Users\<User>\AppData\Roaming\image-link-uploader` (Windows)
pub fn get_config_dir() -> Result<PathBuf, UploadError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| UploadError::configuration("Could not find config directory"))?;
    Ok(config_dir.join(APP_DIR_NAME))
}

/// Get the directory where log files are written.
///
/// Returns: `~/.image-link-uploader/logs`
pub fn get_logs_dir() -> Result<PathBuf, UploadError> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| UploadError::configuration("Could not find home directory"))?;
    Ok(home_dir.join(format!(".{}", APP_DIR_NAME)).join("logs"))
}

/// Get the full path to a config file.
pub fn config_file_path(filename: &str) -> Result<PathBuf, UploadError> {
    Ok(get_config_dir()?.join(filename))
}

/// Save data to a config file in the app's config directory.
///
/// # Returns
/// The path where the file was saved
pub fn save_config_file<T: Serialize>(filename: &str, data: &T) -> Result<PathBuf, UploadError> {
    let config_file = config_file_path(filename)?;
    save_config_to(&config_file, data)?;
    Ok(config_file)
}

/// Load data from a config file in the app's config directory.
///
/// # Returns
/// * `Ok(Some(data))` if file exists and was parsed successfully
/// * `Ok(None)` if file doesn't exist
/// * `Err(...)` if file exists but couldn't be read/parsed
pub fn load_config_file<T: DeserializeOwned>(filename: &str) -> Result<Option<T>, UploadError> {
    load_config_from(&config_file_path(filename)?)
}

/// Write `data` as pretty JSON to `path`, creating parent directories.
pub fn save_config_to<T: Serialize>(path: &Path, data: &T) -> Result<(), UploadError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| UploadError::configuration(format!("Failed to create config directory: {}", e)))?;
    }

    let json = serde_json::to_string_pretty(data)
        .map_err(|e| UploadError::configuration(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, json)
        .map_err(|e| UploadError::configuration(format!("Failed to write config file: {}", e)))?;

    Ok(())
}

/// Read JSON config from `path`; a missing file is `Ok(None)`.
pub fn load_config_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, UploadError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| UploadError::configuration(format!("Failed to read config file: {}", e)))?;

    let data = serde_json::from_str(&contents)
        .map_err(|e| UploadError::configuration(format!("Failed to parse config file: {}", e)))?;

    Ok(Some(data))
}
