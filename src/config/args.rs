//! Command-line argument parsing

use clap::Parser;

use super::{DEFAULT_CONFIG_PATH, StaticConfig};

#[derive(Debug, Clone, Parser)]
#[command(name = "snaplink", version, about = "URL shortener server")]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `server.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut StaticConfig) {
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
