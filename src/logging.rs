//! Structured logging to a file.
//!
//! The terminal belongs to the TUI, so log output never goes to stdout or
//! stderr. With no log file configured no subscriber is installed and every
//! `tracing` call is a no-op.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "tuideck=info";

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("cannot open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("a global tracing subscriber is already installed")]
    AlreadySet,
}

/// Open (or create) the log file for appending.
pub fn open_log_writer(path: &Path) -> Result<File, LogInitError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogInitError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Subscriber writing plain-text events into `file`.
pub fn file_subscriber(file: File) -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true),
    )
}

/// Install the global subscriber. Returns false when no log file is set.
pub fn init(log_file: Option<&Path>) -> Result<bool, LogInitError> {
    let Some(path) = log_file else {
        return Ok(false);
    };
    let file = open_log_writer(path)?;
    file_subscriber(file)
        .try_init()
        .map_err(|_| LogInitError::AlreadySet)?;
    tracing::info!(path = %path.display(), "logging initialised");
    Ok(true)
}

// ============================================================================
// TESTS
// ============================================================================
