//! Error type shared by the store, fetcher, sweeper and cached downloader.

use std::io;
use std::path::{Path, PathBuf};

/// Errors returned by file and download operations.
///
/// Every file-system failure carries the path it happened on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Delete/update target does not exist.
    #[error("file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// Create, write, read, remove, copy or permission change failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Server answered with a non-2xx status.
    #[error("failed to download {url}: {status}")]
    DownloadFailed { url: String, status: String },

    /// Cache directory could not be enumerated during a sweep.
    #[error("failed to list cache directory {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Transport-level failure (connect, DNS, TLS, ...).
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// No cache entry name can be derived from the URL.
    #[error("cannot derive a cache entry name from URL: {url}")]
    InvalidUrl { url: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for the store's "file does not exist" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Attaches the offending path to an `io::Result`.
pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| Error::io(path, e))
    }
}
