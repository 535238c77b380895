use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use lfs_store::AuthConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server settings, usually read from a TOML file.
///
/// ```toml
/// bind_addr = "0.0.0.0:8080"
/// db_path = "/var/lib/lfs/lfs.db"
///
/// [auth]
/// public = false
/// admin = { user = "admin", pass = "secret" }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
            db_path: PathBuf::from("lfs.db"),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}
