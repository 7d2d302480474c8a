//! Process configuration.
//!
//! Read from an optional TOML file; every field has a default, so an empty
//! file (or none at all) is a valid configuration.
//!
//! ```toml
//! listen = "0.0.0.0:3000"
//! log_filter = "leaflet=debug,info"
//!
//! [database]
//! path = "/var/lib/leaflet/blog.db"
//! max_open = 25
//! max_idle = 15
//! max_lifetime_secs = 300
//! acquire_timeout_secs = 5
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: SocketAddr,
    pub log_filter: String,
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_filter: "info".to_owned(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.database.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }
}

/// SQLite file location and connection-pool sizing.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Upper bound on pooled connections.
    pub max_open: u32,
    /// Connections the pool keeps open while idle. Clamped to `max_open`.
    pub max_idle: u32,
    /// Age at which a pooled connection is replaced. `0` keeps connections
    /// for the life of the pool.
    pub max_lifetime_secs: u64,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("leaflet.db"),
            max_open: 25,
            max_idle: 15,
            max_lifetime_secs: 300,
            acquire_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Defaults with the database at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    pub fn min_idle(&self) -> u32 { self.max_idle.min(self.max_open) }

    pub fn max_lifetime(&self) -> Option<Duration> {
        (self.max_lifetime_secs > 0).then(|| Duration::from_secs(self.max_lifetime_secs))
    }

    /// Never shorter than one second; the pool cannot wait zero time.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs.max(1))
    }

    /// Rejects pool settings the pool cannot run with.
    fn check(&self) -> Result<(), Error> {
        if self.max_open == 0 {
            return Err(Error::Config("database.max_open must be at least 1".to_owned()));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(Error::Config("database.acquire_timeout_secs must be at least 1".to_owned()));
        }
        Ok(())
    }
}
