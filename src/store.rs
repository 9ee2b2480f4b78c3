//! Plain file lifecycle: save, update, delete, copy and age queries.
//!
//! Save/update/delete address a file as `dir` + `filename`; the remaining
//! helpers take a full path.

use crate::error::{Error, IoResultExt, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Permission bits applied by `save` and `update` (rw-r--r--).
pub const FILE_MODE: u32 = 0o644;

/// Writes `data` to `dir/filename`, creating or truncating it, with `FILE_MODE`.
pub fn save(dir: &Path, filename: &str, data: &[u8]) -> Result<()> {
    let path = dir.join(filename);
    fs::write(&path, data).at_path(&path)?;
    set_mode(&path, FILE_MODE)?;
    tracing::debug!(path = %path.display(), len = data.len(), "saved file");
    Ok(())
}

/// Removes `dir/filename`. Fails with `Error::NotFound` if it does not exist.
pub fn delete(dir: &Path, filename: &str) -> Result<()> {
    let path = dir.join(filename);
    ensure_exists(&path)?;
    fs::remove_file(&path).at_path(&path)?;
    tracing::debug!(path = %path.display(), "deleted file");
    Ok(())
}

/// Overwrites an existing `dir/filename` exactly like `save`.
/// Fails with `Error::NotFound` if it does not exist.
pub fn update(dir: &Path, filename: &str, data: &[u8]) -> Result<()> {
    ensure_exists(&dir.join(filename))?;
    save(dir, filename, data)
}

/// True unless stat reports the path as missing. Other stat errors
/// (e.g. permission denied on a parent) count as existing.
pub fn exists(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

/// True when `path` was last modified more than `age` ago, or cannot be stat'ed.
pub fn is_older_than(path: &Path, age: Duration) -> bool {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => elapsed_since(mtime) > age,
        Err(_) => true,
    }
}

/// Copies `src` to `dst` (created or truncated) and applies `mode` to `dst`.
pub fn copy_file(src: &Path, dst: &Path, mode: u32) -> Result<u64> {
    let mut input = File::open(src).at_path(src)?;
    let mut output = File::create(dst).at_path(dst)?;
    let copied = io::copy(&mut input, &mut output).at_path(dst)?;
    drop(output);
    set_mode(dst, mode)?;
    Ok(copied)
}

/// Applies POSIX permission bits to `path`.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).at_path(path)
}

/// Non-Unix: only the owner-write bit is meaningful (maps to read-only).
#[cfg(not(unix))]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mut perms = fs::metadata(path).at_path(path)?.permissions();
    perms.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, perms).at_path(path)
}

/// Time since `mtime`; a modification time in the future counts as zero.
pub(crate) fn elapsed_since(mtime: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(mtime)
        .unwrap_or(Duration::ZERO)
}

fn ensure_exists(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound {
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}
