use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIRMATION_TTL_MINUTES: i64 = 60;
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Lifetime of login tokens. `None` means they never expire.
    pub session_ttl_hours: Option<i64>,
    pub confirmation_ttl_minutes: i64,
    /// Upper bound applied to every paged listing.
    pub max_page_size: i64,
}

impl ServerConfig {
    /// Reads a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_page_size < 1 {
            return Err(Error::Config("max_page_size must be at least 1".to_string()));
        }
        if self.confirmation_ttl_minutes < 1 {
            return Err(Error::Config(
                "confirmation_ttl_minutes must be at least 1".to_string(),
            ));
        }
        if self.session_ttl_hours.is_some_and(|h| h < 1) {
            return Err(Error::Config("session_ttl_hours must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("storekeep.db")
    }

    #[must_use]
    pub fn admin_token_path(&self) -> PathBuf {
        self.data_dir.join(".admin_token")
    }

    #[must_use]
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_hours.map(Duration::hours)
    }

    #[must_use]
    pub fn confirmation_ttl(&self) -> Duration {
        Duration::minutes(self.confirmation_ttl_minutes)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            session_ttl_hours: None,
            confirmation_ttl_minutes: DEFAULT_CONFIRMATION_TTL_MINUTES,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}
