use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::common::config::load_config;
use crate::common::constraints::MAX_IMAGE_BYTES;

/// Environment variable that overrides the listening port.
pub const PORT_ENV: &str = "PORT";

/// Complete server configuration, loaded from an optional TOML file.
///
/// Every section and field has a default, so an empty file (or none at all)
/// yields a working server on all interfaces at port 3001.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ListenConfig,
    pub upload: UploadConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory accepted images are written to.
    pub dir: PathBuf,
    /// Largest accepted image, in bytes.
    pub max_file_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_file_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl UploadConfig {
    /// Request body limit: the image limit plus 1 MiB for the text fields.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_file_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(1024 * 1024)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Seed for the simulated image checks. Unseeded randomness when absent.
    pub random_seed: Option<u64>,
}

impl ServerConfig {
    /// Load server configuration from a TOML file.
    ///
    /// # Example
    /// ```ignore
    /// let config = ServerConfig::from_file("config/server.toml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_config(path)
    }

    /// Apply a `PORT` value taken from the environment.
    pub fn apply_port_env(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(raw) = value {
            self.server.port = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid {} value '{}'", PORT_ENV, raw))?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}
