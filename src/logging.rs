//! Tracing setup.
//!
//! The terminal belongs to the UI, so events go to a daily rolling file.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "LAZYTREE_LOG";

/// Keeps the background log writer alive; logs are flushed on drop.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Pick the log directory: config, then the user cache dir, then temp.
pub fn resolve_log_dir(config: &AppConfig) -> std::io::Result<PathBuf> {
    let preferred = config
        .log_dir()
        .or_else(|| dirs::cache_dir().map(|d| d.join("lazytree").join("logs")));
    if let Some(dir) = preferred {
        if std::fs::create_dir_all(&dir).is_ok() {
            return Ok(dir);
        }
    }
    let dir = std::env::temp_dir().join("lazytree").join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Build the filter from `LAZYTREE_LOG`, falling back to the configured level.
pub fn env_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(config.log_level()))
}

/// Install the global subscriber. Returns `None` if logging could not be set
/// up; the application runs without it.
pub fn init(config: &AppConfig) -> Option<LoggingGuard> {
    let log_dir = resolve_log_dir(config).ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "lazytree.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(env_filter(config)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}
