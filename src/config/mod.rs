//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`MPD_HOST`, `MPD_PORT`, `JUKEBOX_LOG`)
//! - CLI arguments (applied by the binary on top of the loaded config)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JukeboxError, Result};
use crate::protocol::DEFAULT_PORT;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| JukeboxError::Config(format!("Failed to read config file: {e}")))?;

        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("MPD_HOST") {
            config.connection.host = host;
        }
        if let Ok(port) = std::env::var("MPD_PORT") {
            if let Ok(port) = port.parse() {
                config.connection.port = port;
            }
        }
        if let Ok(level) = std::env::var("JUKEBOX_LOG") {
            config.logging.level = level;
        }

        config
    }

    /// Default config file location (`<config dir>/jukebox/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jukebox").join("config.toml"))
    }

    /// Load the file at `path` if it exists, then apply the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(path)?,
                _ => Self::default(),
            },
        };
        Ok(base.merge(Self::from_env()))
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(self, other: Self) -> Self {
        let defaults = Self::default();
        Self {
            connection: ConnectionConfig {
                host: if other.connection.host != defaults.connection.host {
                    other.connection.host
                } else {
                    self.connection.host
                },
                port: if other.connection.port != defaults.connection.port {
                    other.connection.port
                } else {
                    self.connection.port
                },
                connect_timeout_secs: if other.connection.connect_timeout_secs
                    != defaults.connection.connect_timeout_secs
                {
                    other.connection.connect_timeout_secs
                } else {
                    self.connection.connect_timeout_secs
                },
            },
            logging: LoggingConfig {
                level: if other.logging.level != defaults.logging.level {
                    other.logging.level
                } else {
                    self.logging.level
                },
            },
        }
    }
}

/// MPD connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Host name, IP address, or absolute path of a unix socket
    pub host: String,

    /// TCP port (ignored for unix sockets)
    pub port: u16,

    /// Connect timeout in seconds (0 disables it)
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_secs: 10,
        }
    }
}

impl ConnectionConfig {
    /// Get the full server address
    pub fn address(&self) -> String {
        if self.is_unix_socket() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// MPD convention: a host starting with `/` names a unix socket
    pub fn is_unix_socket(&self) -> bool {
        self.host.starts_with('/')
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
