//! Logging bootstrap for Memory Book.
//!
//! Library code logs through `tracing` macros; binaries call one of the
//! `init_*` functions once at startup to install a subscriber.
//!
//! # Example
//!
//! ```no_run
//! use mb_core::logging::{init_tracing_with_file, LogLevel};
//!
//! // Keep the guard alive for the life of the program so the file is flushed.
//! let _guard = init_tracing_with_file(LogLevel::Info, ".logs").unwrap();
//! tracing::info!("ready");
//! ```

mod types;

pub use types::{LogLevel, ParseLogLevelError};

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling log files.
const LOG_FILE_PREFIX: &str = "memory-book.log";

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(env_filter(default_level))
        .init();
}

/// Like [`init_tracing`], and also writes a daily-rolling file in `logs_dir`.
///
/// The returned guard flushes the file writer when dropped.
pub fn init_tracing_with_file(
    default_level: LogLevel,
    logs_dir: impl AsRef<Path>,
) -> io::Result<WorkerGuard> {
    let logs_dir = logs_dir.as_ref();
    std::fs::create_dir_all(logs_dir)?;

    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .init();

    tracing::debug!("Logging to {}", logs_dir.display());
    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}
