//! Single-stream HTTP GET into a local file.
//!
//! The destination is created before the request goes out, so a failed
//! request leaves an empty file behind. Bodies of non-2xx responses are
//! never written.

use crate::error::{Error, IoResultExt, Result};
use crate::store;
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Redirect hops followed before giving up (matches common HTTP client defaults).
pub const DEFAULT_MAX_REDIRECTIONS: u32 = 10;

/// Downloads a URL to a path. The cached downloader is generic over this so
/// tests can substitute a fake.
pub trait Fetcher {
    /// GET `url`, stream the body to `dest` and apply `mode` to it.
    fn download(&self, url: &str, dest: &Path, mode: u32) -> Result<()>;
}

/// Blocking libcurl fetcher. No custom headers, no auth, libcurl default timeouts.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    max_redirections: u32,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            max_redirections: DEFAULT_MAX_REDIRECTIONS,
        }
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_redirections(mut self, max: u32) -> Self {
        self.max_redirections = max;
        self
    }
}

impl Fetcher for HttpFetcher {
    fn download(&self, url: &str, dest: &Path, mode: u32) -> Result<()> {
        let mut out = File::create(dest).at_path(dest)?;
        let request_err = |source: curl::Error| Error::Request {
            url: url.to_string(),
            source,
        };

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(request_err)?;
        easy.follow_location(true).map_err(request_err)?;
        easy.max_redirections(self.max_redirections).map_err(request_err)?;

        // Status line of the latest response; redirects overwrite it.
        let status: RefCell<Option<StatusLine>> = RefCell::new(None);
        let write_err: RefCell<Option<io::Error>> = RefCell::new(None);
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Some(line) = StatusLine::parse(data) {
                        *status.borrow_mut() = Some(line);
                    }
                    true
                })
                .map_err(request_err)?;
            transfer
                .write_function(|data| {
                    let success = status.borrow().as_ref().map_or(true, StatusLine::is_success);
                    if !success {
                        // Drain the error body without touching the file.
                        return Ok(data.len());
                    }
                    match out.write_all(data) {
                        Ok(()) => Ok(data.len()),
                        Err(e) => {
                            *write_err.borrow_mut() = Some(e);
                            Ok(0) // abort transfer
                        }
                    }
                })
                .map_err(request_err)?;
            transfer.perform()
        };

        if let Some(e) = write_err.into_inner() {
            return Err(Error::io(dest, e));
        }
        performed.map_err(request_err)?;

        let code = easy.response_code().map_err(request_err)?;
        if !(200..300).contains(&code) {
            let status = status
                .into_inner()
                .map(|s| s.text)
                .unwrap_or_else(|| code.to_string());
            tracing::debug!(url, status = %status, "download rejected by server");
            return Err(Error::DownloadFailed {
                url: url.to_string(),
                status,
            });
        }

        out.flush().at_path(dest)?;
        drop(out);
        store::set_mode(dest, mode)?;
        tracing::info!(url, dest = %dest.display(), "downloaded");
        Ok(())
    }
}

/// Parsed `HTTP/x.y CODE REASON` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusLine {
    code: u32,
    /// Everything after the protocol version, e.g. `404 Not Found`.
    text: String,
}

impl StatusLine {
    fn parse(header: &[u8]) -> Option<Self> {
        let line = std::str::from_utf8(header).ok()?.trim_end();
        let rest = line.strip_prefix("HTTP/")?;
        let (_, text) = rest.split_once(' ')?;
        let text = text.trim();
        let code = text.split_whitespace().next()?.parse().ok()?;
        Some(Self {
            code,
            text: text.to_string(),
        })
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}
