//! Log output setup.
//!
//! The library itself only emits `tracing` events. Callers that want them
//! printed call [`init_logging`] once at startup; `RUST_LOG` overrides the
//! configured level.

use crate::config_utils;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "image-link-uploader.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines on stderr instead of human-readable text
    pub json: bool,
    /// Also write a daily rolling log file into this directory
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

impl LogConfig {
    /// Read `IMAGE_UPLOADER_LOG`, `IMAGE_UPLOADER_LOG_JSON` and
    /// `IMAGE_UPLOADER_LOG_FILE` (file logs go to the app's logs dir).
    pub fn from_env() -> Self {
        let flag = |name: &str| {
            std::env::var(name)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        let directory = if flag("IMAGE_UPLOADER_LOG_FILE") {
            config_utils::get_logs_dir().ok()
        } else {
            None
        };

        Self {
            level: std::env::var("IMAGE_UPLOADER_LOG").unwrap_or_else(|_| "info".to_string()),
            json: flag("IMAGE_UPLOADER_LOG_JSON"),
            directory,
        }
    }
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is on; keep it alive
/// for as long as logs should be flushed. A second call leaves the first
/// subscriber in place and returns `None`.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = if config.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already installed");
        return None;
    }

    guard
}
