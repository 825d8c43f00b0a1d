use indexmap::IndexMap;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::http::HttpVersion;

pub const DEFAULT_TOKEN: &str = "your_token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub buffer_size: usize,

    pub http_version: HttpVersion,
    pub max_path_size: usize,
    pub max_header_size: usize,
    pub max_body_size: usize,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub write_timeout: Duration,

    pub server_name: String,
    pub log_level: String,

    /// Bodies shorter than this are never compressed.
    pub compression_min_size: usize,

    /// Headers every request must carry, checked in declaration order.
    pub required_headers: IndexMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5000,
            buffer_size: 4096,

            http_version: HttpVersion::V1_1,
            max_path_size: 1024,
            max_header_size: 8192,
            max_body_size: 1024 * 1024, // 1 MB

            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),

            server_name: "mockstore/0.1".to_string(),
            log_level: "info".to_string(),

            compression_min_size: 256,

            required_headers: default_required_headers(),
        }
    }
}

impl ServerConfig {
    /// Reads and deserializes a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str::<ServerConfig>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces the expected `Authorization` value with `Bearer <token>`.
    pub fn set_bearer_token(&mut self, token: &str) {
        self.required_headers
            .insert("Authorization".to_string(), format!("Bearer {token}"));
    }
}

fn default_required_headers() -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    headers.insert("X-Requested-With".to_string(), "XMLHttpRequest".to_string());
    headers.insert("Authorization".to_string(), format!("Bearer {DEFAULT_TOKEN}"));
    headers
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(serde::de::Error::custom("duration must be a non-negative number of seconds"));
    }
    Ok(Duration::from_secs_f64(secs))
}
