// Application state module
// Immutable state shared by every connection

use std::path::Path;

use super::types::Config;
use crate::error::ConfigError;
use crate::listing::DirectoryLister;

/// Application state, built once at startup and shared through `Arc`
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub lister: DirectoryLister,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            lister: DirectoryLister::new()?,
        })
    }

    /// Canonical root directory
    pub fn root_dir(&self) -> &Path {
        &self.config.server.root_dir
    }

    /// Whether an access log line is written per request
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }

    #[cfg(test)]
    pub fn for_root(root: std::path::PathBuf) -> Self {
        use super::types::{LoggingConfig, PerformanceConfig, ServerConfig};

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                root_dir: root,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
            },
            performance: PerformanceConfig {
                workers: None,
                max_connections: None,
                keep_alive: true,
                header_read_timeout: 30,
            },
        };
        Self::new(config).expect("listing template compiles")
    }
}
