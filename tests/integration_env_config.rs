//! Integration test: `dlcache::fetch_cached` reads `CACHE_DIR` / `CACHE_SECONDS`
//! on every call. Kept in its own binary since it mutates the process environment.

mod common;

use common::http_server::{self, Route};
use dlcache::cache::FetchSource;
use std::fs;
use tempfile::tempdir;

#[test]
fn environment_is_read_at_call_time() {
    let server = http_server::start(vec![("/img.qcow2", Route::Body(b"disk image".to_vec()))]);
    let url = server.url("/img.qcow2");
    let dir = tempdir().unwrap();
    let cache = dir.path().join("cache");

    std::env::remove_var("CACHE_DIR");
    std::env::remove_var("CACHE_SECONDS");
    let direct = dir.path().join("direct.qcow2");
    assert_eq!(dlcache::fetch_cached(&url, &direct, 0o644).unwrap(), FetchSource::Direct);
    assert!(!cache.exists());

    std::env::set_var("CACHE_DIR", &cache);
    std::env::set_var("CACHE_SECONDS", "bogus");
    let first = dir.path().join("first.qcow2");
    let second = dir.path().join("second.qcow2");
    assert!(matches!(
        dlcache::fetch_cached(&url, &first, 0o644).unwrap(),
        FetchSource::CacheMiss(_)
    ));
    assert!(matches!(
        dlcache::fetch_cached(&url, &second, 0o644).unwrap(),
        FetchSource::CacheHit(_)
    ));
    std::env::remove_var("CACHE_DIR");
    std::env::remove_var("CACHE_SECONDS");

    assert_eq!(server.hits("/img.qcow2"), 2);
    assert_eq!(fs::read(&second).unwrap(), b"disk image");
    assert!(cache.join("img.qcow2").exists());
}
