// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use crate::error::ConfigError;
use std::net::{SocketAddr, ToSocketAddrs};

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, Overrides, PerformanceConfig, ServerConfig};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the specified file path (extension optional).
    ///
    /// Sources, later wins: built-in defaults, the config file (if present),
    /// `SERVER_*` environment variables (`__` separates nested keys), then
    /// command-line overrides. The root directory is canonicalised and must
    /// be an existing directory.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.root_dir", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option(
                "server.root_dir",
                overrides
                    .root_dir
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.server.root_dir = canonical_root(&cfg.server.root_dir)?;
        Ok(cfg)
    }

    /// Resolve `host:port` to the address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        let invalid = |source| ConfigError::InvalidAddress {
            addr: addr.clone(),
            source,
        };
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(invalid)?
            .next()
            .ok_or_else(|| {
                invalid(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "host resolved to no addresses",
                ))
            })
    }

    /// Address shown to the operator and opened in the browser
    pub fn public_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}

fn canonical_root(path: &std::path::Path) -> Result<std::path::PathBuf, ConfigError> {
    let root_err = |source| ConfigError::RootDir {
        path: path.display().to_string(),
        source,
    };
    let canonical = std::fs::canonicalize(path).map_err(root_err)?;
    if !canonical.is_dir() {
        return Err(root_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a directory",
        )));
    }
    Ok(canonical)
}
