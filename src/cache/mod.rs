//! Cache-aware download: sweep, hit check, fetch-on-miss, copy out.
//!
//! A hit is any file present at the entry path after the sweep. Its age is
//! not re-checked, so eviction relies entirely on the sweep that precedes
//! the lookup.

pub mod entry;

use crate::config::CacheConfig;
use crate::error::{Error, IoResultExt, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::{store, sweep};
use std::fs;
use std::path::{Path, PathBuf};

pub use entry::entry_name;

/// Where the destination content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSource {
    /// Caching disabled; downloaded straight to the destination.
    Direct,
    /// Served from an existing cache entry.
    CacheHit(PathBuf),
    /// Downloaded into the cache entry, then copied.
    CacheMiss(PathBuf),
}

/// Downloads through an optional shared disk cache.
pub struct CachedDownloader<F = HttpFetcher> {
    config: CacheConfig,
    fetcher: F,
}

impl CachedDownloader<HttpFetcher> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_fetcher(config, HttpFetcher::default())
    }

    /// Configuration taken from `CACHE_DIR` / `CACHE_SECONDS` right now.
    pub fn from_env() -> Self {
        Self::new(CacheConfig::from_env())
    }
}

impl<F: Fetcher> CachedDownloader<F> {
    pub fn with_fetcher(config: CacheConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Puts the content of `url` at `dest` with permission bits `mode`,
    /// going through the cache when one is configured.
    pub fn fetch_cached(&self, url: &str, dest: &Path, mode: u32) -> Result<FetchSource> {
        let Some(cache_dir) = self.config.cache_dir() else {
            tracing::debug!(url, "cache disabled, downloading directly");
            self.fetcher.download(url, dest, mode)?;
            return Ok(FetchSource::Direct);
        };

        ensure_cache_dir(cache_dir)?;
        if let Err(e) = sweep::clean(cache_dir, self.config.ttl()) {
            tracing::warn!(
                cache_dir = %cache_dir.display(),
                error = %e,
                "cache sweep failed, continuing"
            );
        }

        let name = entry_name(url).ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
        })?;
        let entry_path = cache_dir.join(name);

        if store::exists(&entry_path) {
            tracing::debug!(url, entry = %entry_path.display(), "cache hit");
            store::copy_file(&entry_path, dest, mode)?;
            return Ok(FetchSource::CacheHit(entry_path));
        }

        tracing::debug!(url, entry = %entry_path.display(), "cache miss");
        self.fetcher.download(url, &entry_path, mode)?;
        store::copy_file(&entry_path, dest, mode)?;
        Ok(FetchSource::CacheMiss(entry_path))
    }
}

/// Resolves caching from the environment at call time and fetches with libcurl.
pub fn fetch_cached(url: &str, dest: &Path, mode: u32) -> Result<FetchSource> {
    CachedDownloader::from_env().fetch_cached(url, dest, mode)
}

/// Creates the cache dir and parents (0o777 before umask).
fn ensure_cache_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder.create(dir).at_path(dir)
}
