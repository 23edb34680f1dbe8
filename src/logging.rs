//! Log setup: stdout plus one timestamped file per run.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "peregrine_kernel=info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global tracing subscriber: an `EnvFilter` (from `RUST_LOG`,
/// defaulting to `peregrine_kernel=info`), a compact stdout layer and a
/// non-rotating file layer writing `<dir>/<prefix>_<timestamp>.log`.
///
/// Only the newest `keep` files with the same prefix are kept. Returns the path
/// of this run's log file.
pub fn init_file_logging(
    log_dir: impl AsRef<Path>,
    prefix: &str,
    keep: usize,
) -> Result<PathBuf, LoggingError> {
    let log_dir = log_dir.as_ref();
    if !log_dir.exists() {
        fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
            path: log_dir.display().to_string(),
            source,
        })?;
    }

    // Leave room for the file this run is about to create
    cleanup_old_logs(log_dir, prefix, keep.saturating_sub(1));

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", prefix, now.format("%Y%m%d_%H%M%S"));
    let log_file_path = log_dir.join(&log_filename);

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(log_file_path)
}

/// Deletes the oldest `<prefix>*.log` files in `log_dir` until at most
/// `keep_count` remain. Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &Path, prefix: &str, keep_count: usize) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.starts_with(prefix) && s.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    if log_files.len() <= keep_count {
        return 0;
    }

    // Oldest first; the timestamped names break ties between equal mtimes
    log_files.sort_by_key(|e| (e.metadata().ok().and_then(|m| m.modified().ok()), e.file_name()));

    let excess = log_files.len() - keep_count;
    log_files
        .iter()
        .take(excess)
        .filter(|file| fs::remove_file(file.path()).is_ok())
        .count()
}
