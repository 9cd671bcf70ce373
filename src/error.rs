//! Error types
//!
//! Per-request failures are converted into responses at the router boundary;
//! startup failures bubble up to `main`.

use std::io;
use thiserror::Error;

/// Result type alias for request serving
pub type Result<T> = std::result::Result<T, ServeError>;

/// Errors raised while serving a single request
#[derive(Error, Debug)]
pub enum ServeError {
    /// Stat, open or directory read failed (missing file, permission denied, broken symlink)
    #[error("{source}, stat '{path}'")]
    NotFound {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Request path tried to leave the root directory
    #[error("path escapes root directory: '{path}'")]
    PathEscapesRoot { path: String },

    /// Directory listing template failed to render
    #[error("failed to render directory listing: {0}")]
    Render(String),
}

impl ServeError {
    pub fn not_found(path: impl Into<String>, source: io::Error) -> Self {
        Self::NotFound {
            path: path.into(),
            source,
        }
    }

    /// HTTP status this error is answered with
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::PathEscapesRoot { .. } => 404,
            Self::Render(_) => 500,
        }
    }
}

/// Errors raised while assembling the startup configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("root directory '{path}' is not usable: {source}")]
    RootDir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("directory listing template: {0}")]
    Template(#[from] minijinja::Error),
}
