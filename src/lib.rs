//! Upload local images to an image host and get shareable links back.
//!
//! Two hosts are supported, each behind a cargo feature:
//!
//! * `imgbb` - [`ImgbbUploader`], API key in the query string
//! * `cloudinary` - [`CloudinaryUploader`], signed or upload-preset based
//!
//! Both implement [`ImageHost`]. [`BatchUploader`] uploads up to
//! [`MAX_BATCH_SIZE`] images through any host concurrently and returns the
//! URLs in input order, failing as a whole if any single upload fails.
//!
//! ```no_run
//! # async fn run() -> Result<(), image_link_uploader::UploadError> {
//! use image_link_uploader::{build_uploader, BatchUploader, ImageFile, UploaderConfig};
//! use std::path::Path;
//!
//! let config = UploaderConfig::load()?;
//! let uploader = build_uploader(&config)?;
//!
//! let files = vec![
//!     ImageFile::from_path(Path::new("cat.png")).await?,
//!     ImageFile::from_path(Path::new("dog.jpg")).await?,
//! ];
//! let urls = BatchUploader::new(uploader).execute(&files).await?;
//! # let _ = urls;
//! # Ok(())
//! # }
//! ```

pub mod api_contracts;
pub mod config_utils;
pub mod credentials;
pub mod error;
pub mod host;
pub mod logging;
pub mod services;
pub mod types;

#[cfg(feature = "cloudinary")]
pub mod cloudinary_uploader;
#[cfg(feature = "imgbb")]
pub mod imgbb_uploader;
#[cfg(feature = "cloudinary")]
pub mod signing;

#[cfg(test)]
mod test_harness;

#[cfg(feature = "cloudinary")]
pub use cloudinary_uploader::CloudinaryUploader;
pub use credentials::{
    CloudinaryAuth, CloudinaryCredentials, ImgbbCredentials, ProviderConfig, SigningPolicy,
    UploaderConfig,
};
pub use error::{ErrorKind, UploadError};
pub use host::{build_uploader, ImageHost, Provider};
#[cfg(feature = "imgbb")]
pub use imgbb_uploader::ImgbbUploader;
pub use logging::{init_logging, LogConfig};
pub use services::{upload_batch, BatchUploader, MAX_BATCH_SIZE};
pub use types::ImageFile;
