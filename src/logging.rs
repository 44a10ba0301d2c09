//! Logging setup for tabular-insight.
//!
//! Logs go to stderr and to daily-rotating files, so JSON printed on stdout
//! stays clean.
//!
//! - `tabular-insight.<date>.log`: everything the filter lets through
//! - `error.<date>.log`: warnings and errors only
//!
//! The filter defaults to `info` and honours `RUST_LOG`.
//!
//! ```no_run
//! tabular_insight::logging::init(None).expect("Failed to initialize logging");
//! tracing::info!("ready");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const APP_DIR: &str = "tabular-insight";
const MAX_LOG_FILES: usize = 10;

/// Platform log directory:
/// - Windows: `%APPDATA%/tabular-insight/logs`
/// - macOS: `~/Library/Application Support/tabular-insight/logs`
/// - Linux: `~/.local/share/tabular-insight/logs`
///
/// # Errors
///
/// Fails if the platform has no data directory.
pub fn default_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(base_dir.join(APP_DIR).join("logs"))
}

/// Resolves the log directory (the override, else the platform default)
/// and creates it.
///
/// # Errors
///
/// Fails if the directory cannot be determined or created.
pub fn ensure_log_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    let log_dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_log_dir()?,
    };
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }
    Ok(log_dir)
}

fn file_appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Installs the global subscriber. Call once, at startup.
///
/// # Errors
///
/// Fails if the log directory or the file appenders cannot be created, or if
/// a global subscriber is already installed.
pub fn init(log_dir: Option<&Path>) -> Result<()> {
    let log_dir = ensure_log_dir(log_dir)?;
    let all_logs_appender = file_appender(&log_dir, APP_DIR)?;
    let error_logs_appender = file_appender(&log_dir, "error")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!("Logging initialized, log directory: {}", log_dir.display());
    Ok(())
}
