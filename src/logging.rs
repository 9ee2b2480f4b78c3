//! Optional subscriber setup for hosts embedding dlcache.
//!
//! The library only emits `tracing` events. A host without its own
//! subscriber can send them to a log file or to stderr.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,dlcache=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `$XDG_STATE_HOME/dlcache/dlcache.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlcache")?;
    Ok(xdg_dirs.get_state_home().join("dlcache.log"))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log dir {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Installs a global subscriber appending to `path`.
/// Errors if the file cannot be opened or a subscriber is already set.
pub fn init_logging_to(path: &Path) -> Result<()> {
    let file = Arc::new(open_log_file(path)?);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(file)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))?;
    tracing::info!(path = %path.display(), "dlcache logging initialized");
    Ok(())
}

/// `init_logging_to` at the XDG state log path. Returns the path used.
/// On error the caller can fall back to `init_logging_stderr`.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    init_logging_to(&path)?;
    Ok(path)
}

/// Installs a stderr subscriber; a no-op if one is already set.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
