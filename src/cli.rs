// Command line interface
// Flags override the config file and environment

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Overrides, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "static_server", version)]
#[command(about = "Serve a local directory over HTTP", long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host or address to bind
    #[arg(short = 'o', long)]
    pub host: Option<String>,

    /// Directory to serve
    #[arg(short = 'd', long = "dir")]
    pub root_dir: Option<PathBuf>,

    /// Config file, extension optional
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Open the served URL in the default browser once listening
    #[arg(long)]
    pub open: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            root_dir: self.root_dir.clone(),
        }
    }
}
