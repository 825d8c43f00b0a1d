//! Command-line arguments. Flags override the values from the config file.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use mockstore::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "mockstore", version, about = "In-memory mock JSON document store")]
pub struct Args {
    /// Path to TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    pub address: Option<IpAddr>,

    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,

    /// Bearer token expected in the Authorization header.
    #[arg(long)]
    pub token: Option<String>,
}

impl Args {
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(token) = &self.token {
            config.set_bearer_token(token);
        }
    }
}
