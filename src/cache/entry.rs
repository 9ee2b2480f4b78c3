//! Cache entry naming.
//!
//! An entry is named after the last non-empty path segment of its URL, so
//! two URLs ending in the same segment share one entry.

/// Cache filename for `url`: last path segment, else the host name.
///
/// Returns `None` when the URL cannot be parsed or has neither.
pub fn entry_name(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .filter(|s| *s != "." && *s != "..");
    match segment {
        Some(s) => Some(s.to_string()),
        None => parsed.host_str().map(str::to_string),
    }
}
