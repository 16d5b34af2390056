// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub access_point: AccessPointConfig,
}

/// How accepted connections are scheduled
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One connection at a time, served to completion before the next accept
    Serial,
    /// Single task waiting on the listener and every connection at once
    Multiplexed,
    /// One handler task per admitted connection
    #[default]
    PerConnection,
}

impl Strategy {
    /// Listen backlog used when `server.backlog` is not set
    pub const fn default_backlog(self) -> i32 {
        match self {
            Self::Serial => 1,
            Self::Multiplexed | Self::PerConnection => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Multiplexed => "multiplexed",
            Self::PerConnection => "per_connection",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener and dispatcher configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub strategy: Strategy,
    /// Listen backlog; falls back to the strategy default
    #[serde(default)]
    pub backlog: Option<i32>,
    /// Admission limit for simultaneously served connections
    pub max_connections: usize,
    /// Upper bound on bytes taken per read call
    pub read_chunk: usize,
    /// Tokio worker threads (CPU cores when unset)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Log verbosity, ordered from least to most verbose
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

/// Log line layout
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Whether received bytes are written to the log verbatim
    pub log_payload: bool,
    /// Info log file path (optional, stdout if not set)
    #[serde(default)]
    pub info_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Wireless access point the listener is reachable through
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AccessPointConfig {
    pub ssid: String,
    /// Empty password means an open network
    pub password: String,
    pub max_stations: u8,
    pub channel: u8,
}
