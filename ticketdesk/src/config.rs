//! Configuration management for the catalog server.
//!
//! Loads configuration from environment variables with sensible defaults. The binary
//! loads a `.env` file first, so everything here can also live there.

use std::{env, fmt, path::PathBuf, str::FromStr};

use chrono::FixedOffset;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "ticketdesk=info,tower_http=info";
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGODB_DATABASE: &str = "ticketdesk";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },
    #[error("{var} must be 'memory' or 'mongodb', got {value:?}")]
    UnknownStore { var: &'static str, value: String },
    #[error("{var} must be a UTC offset like +05:30, got {value:?}")]
    InvalidOffset { var: &'static str, value: String },
}

/// Which backend holds the tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Memory,
    MongoDb,
}

impl FromStr for StoreKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "mongodb" | "mongo" => Ok(StoreKind::MongoDb),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreKind::Memory => "memory",
            StoreKind::MongoDb => "mongodb",
        })
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// `tracing` filter directives
    pub log_filter: String,
    pub store: StoreKind,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// JSON array of tickets inserted at startup
    pub seed_file: Option<PathBuf>,
    /// Pins the zone tickets are presented in; the process local zone otherwise
    pub display_offset: Option<FixedOffset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            store: StoreKind::default(),
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            mongodb_database: DEFAULT_MONGODB_DATABASE.to_string(),
            seed_file: None,
            display_offset: None,
        }
    }
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    match value.trim() {
        "Z" | "z" | "UTC" | "utc" => FixedOffset::east_opt(0),
        other => other.parse().ok(),
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is set to something unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a variable if set.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is set to something unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { var: "PORT", value })?,
            None => defaults.port,
        };

        let store = match var("TICKETDESK_STORE") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::UnknownStore { var: "TICKETDESK_STORE", value })?,
            None => defaults.store,
        };

        let display_offset = match var("TICKETDESK_DISPLAY_UTC_OFFSET") {
            Some(value) => Some(
                parse_offset(&value)
                    .ok_or(ConfigError::InvalidOffset { var: "TICKETDESK_DISPLAY_UTC_OFFSET", value })?,
            ),
            None => None,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            log_filter: var("RUST_LOG").unwrap_or(defaults.log_filter),
            store,
            mongodb_uri: var("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_database: var("MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            seed_file: var("TICKETDESK_SEED_FILE").map(PathBuf::from),
            display_offset,
        })
    }

    /// `host:port` to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
