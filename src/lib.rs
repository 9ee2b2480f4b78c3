//! File store helpers and an HTTP download utility backed by an age-evicted
//! disk cache.
//!
//! The main entry point is [`CachedDownloader::fetch_cached`]: with a cache
//! directory configured it sweeps expired entries, serves hits from disk and
//! downloads misses into the cache before copying them to the destination.
//! Without one it downloads straight to the destination.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod store;
pub mod sweep;

pub use cache::{fetch_cached, CachedDownloader};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpFetcher};
