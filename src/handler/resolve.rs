//! Path resolution
//!
//! Maps a request path onto the root directory and classifies the target.
//! Containment is checked twice: lexically while joining segments, and on
//! the canonical path after stat so symlinks cannot point outside the root.

use crate::error::{Result, ServeError};
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// What a resolved path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// Stat result the rest of the pipeline needs
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub kind: FileKind,
    pub size: u64,
    pub modified: SystemTime,
}

impl FileInfo {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// A request path resolved inside the root directory
#[derive(Debug, Clone)]
pub struct Resolved {
    pub path: PathBuf,
    pub info: FileInfo,
}

/// Request path without query string, percent-decoded, defaulting to `/`
pub fn requested_path(raw: &str) -> String {
    let path = raw.split_once('?').map_or(raw, |(p, _)| p);
    if path.is_empty() {
        return "/".to_string();
    }
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Join `requested` onto `root` without ever leaving it.
///
/// `.` and empty segments are skipped, `..` drops the previous segment, and
/// a `..` with nothing left to drop is a traversal attempt.
pub fn join_within_root(root: &Path, requested: &str) -> Result<PathBuf> {
    let escape = || ServeError::PathEscapesRoot {
        path: requested.to_string(),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in requested.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop().ok_or_else(escape)?;
            }
            _ => {
                // Reject anything the platform would not treat as a plain name
                // (drive prefixes, embedded separators)
                let mut components = Path::new(segment).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(segment),
                    _ => return Err(escape()),
                }
            }
        }
    }

    let mut path = root.to_path_buf();
    path.extend(segments);
    Ok(path)
}

/// Resolve and stat a request path.
///
/// `root` must already be canonical.
pub async fn resolve(root: &Path, requested: &str) -> Result<Resolved> {
    let path = join_within_root(root, requested)?;

    let metadata = fs::metadata(&path)
        .await
        .map_err(|e| ServeError::not_found(requested, e))?;

    let canonical = fs::canonicalize(&path)
        .await
        .map_err(|e| ServeError::not_found(requested, e))?;
    if !canonical.starts_with(root) {
        return Err(ServeError::PathEscapesRoot {
            path: requested.to_string(),
        });
    }

    let kind = if metadata.is_dir() {
        FileKind::Directory
    } else {
        FileKind::File
    };

    // A trailing slash names a directory, like a stat of `file/` would
    if kind == FileKind::File && requested.ends_with('/') {
        return Err(ServeError::not_found(
            requested,
            std::io::Error::new(std::io::ErrorKind::NotFound, "Not a directory"),
        ));
    }

    Ok(Resolved {
        path,
        info: FileInfo {
            kind,
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        },
    })
}
