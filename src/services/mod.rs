//! Service modules built on top of the single-image uploaders
//!
//! The batch service fans uploads out over any `ImageHost` and joins the
//! results back in input order.

pub mod batch_uploader;

pub use batch_uploader::{upload_batch, BatchUploader, MAX_BATCH_SIZE};
