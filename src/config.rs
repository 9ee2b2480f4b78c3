use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the cache directory; empty or unset disables caching.
pub const CACHE_DIR_ENV: &str = "CACHE_DIR";
/// Environment variable holding the cache TTL in whole seconds.
pub const CACHE_SECONDS_ENV: &str = "CACHE_SECONDS";
/// Default cache TTL: 7 days.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 604_800;

fn default_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

/// Caching configuration for `CachedDownloader`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Shared cache directory. `None` or an empty path disables caching.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Entries last modified longer ago than this are evicted by the sweep.
    #[serde(default = "default_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Caching enabled in `cache_dir` with the default TTL.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(cache_dir.into()),
            ..Self::default()
        }
    }

    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Reads `CACHE_DIR` and `CACHE_SECONDS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Like `from_env` but against an arbitrary variable lookup.
    /// A missing or non-numeric `CACHE_SECONDS` yields the 7-day default.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_dir = lookup(CACHE_DIR_ENV)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        let cache_ttl_secs = lookup(CACHE_SECONDS_ENV)
            .and_then(|s| parse_ttl_secs(&s))
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        Self {
            cache_dir,
            cache_ttl_secs,
        }
    }

    /// Applies a non-empty `CACHE_DIR` and a valid `CACHE_SECONDS` on top of `self`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|s| !s.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup(CACHE_SECONDS_ENV).and_then(|s| parse_ttl_secs(&s)) {
            self.cache_ttl_secs = secs;
        }
        self
    }

    /// Cache directory when caching is enabled.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.cache_dir().is_some()
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_ttl_secs(s: &str) -> Option<u64> {
    s.parse::<u64>().ok()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlcache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Parse a `config.toml` at `path`.
pub fn load_from(path: &Path) -> Result<CacheConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: CacheConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CacheConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}
