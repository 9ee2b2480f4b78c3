//! Age-based eviction of top-level cache files.
//!
//! Only a failure to list the directory aborts a sweep. Per-file stat or
//! delete failures are recorded in the report and the pass moves on.

use crate::error::{Error, Result};
use crate::store;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What happened to one directory entry during a sweep.
#[derive(Debug)]
pub enum SweepOutcome {
    /// File is younger than the TTL.
    Kept(PathBuf),
    /// File was older than the TTL and has been deleted.
    Removed(PathBuf),
    /// Subdirectory; never descended into.
    SkippedDir(PathBuf),
    /// Stat or delete failed; swallowed.
    Failed { path: PathBuf, error: io::Error },
}

/// Per-entry outcomes of one sweep, in directory listing order.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub outcomes: Vec<SweepOutcome>,
}

impl SweepReport {
    pub fn removed(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            SweepOutcome::Removed(p) => Some(p.as_path()),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &io::Error)> {
        self.outcomes.iter().filter_map(|o| match o {
            SweepOutcome::Failed { path, error } => Some((path.as_path(), error)),
            _ => None,
        })
    }
}

/// Deletes every top-level file in `cache_dir` older than `ttl`.
/// Fails only when the directory cannot be listed.
pub fn clean(cache_dir: &Path, ttl: Duration) -> Result<()> {
    clean_with(cache_dir, ttl, |p| fs::remove_file(p))
}

/// Same pass as `clean`, returning what happened to each entry.
pub fn sweep(cache_dir: &Path, ttl: Duration) -> Result<SweepReport> {
    sweep_with(cache_dir, ttl, |p| fs::remove_file(p))
}

fn clean_with<R>(cache_dir: &Path, ttl: Duration, remove: R) -> Result<()>
where
    R: FnMut(&Path) -> io::Result<()>,
{
    let report = sweep_with(cache_dir, ttl, remove)?;
    for (path, error) in report.failures() {
        tracing::debug!(path = %path.display(), error = %error, "cache sweep skipped entry");
    }
    Ok(())
}

/// Sweep with a pluggable file remover.
fn sweep_with<R>(cache_dir: &Path, ttl: Duration, mut remove: R) -> Result<SweepReport>
where
    R: FnMut(&Path) -> io::Result<()>,
{
    let list_err = |source| Error::ListDir {
        path: cache_dir.to_path_buf(),
        source,
    };
    let read_dir = fs::read_dir(cache_dir).map_err(list_err)?;

    let mut report = SweepReport::default();
    for entry in read_dir {
        let entry = entry.map_err(list_err)?;
        report.outcomes.push(sweep_entry(&entry, ttl, &mut remove));
    }

    tracing::debug!(
        cache_dir = %cache_dir.display(),
        entries = report.outcomes.len(),
        removed = report.removed().count(),
        ttl_secs = ttl.as_secs(),
        "cache sweep finished"
    );
    Ok(report)
}

fn sweep_entry<R>(entry: &fs::DirEntry, ttl: Duration, remove: &mut R) -> SweepOutcome
where
    R: FnMut(&Path) -> io::Result<()>,
{
    let path = entry.path();
    // DirEntry::metadata does not follow symlinks, so a link to a directory
    // is treated as a file.
    let meta = match entry.metadata() {
        Ok(m) => m,
        Err(error) => return SweepOutcome::Failed { path, error },
    };
    if meta.is_dir() {
        return SweepOutcome::SkippedDir(path);
    }
    let mtime = match meta.modified() {
        Ok(t) => t,
        Err(error) => return SweepOutcome::Failed { path, error },
    };
    if store::elapsed_since(mtime) <= ttl {
        return SweepOutcome::Kept(path);
    }
    match remove(&path) {
        Ok(()) => SweepOutcome::Removed(path),
        Err(error) => SweepOutcome::Failed { path, error },
    }
}
