// Configuration module entry point
// Loads layered configuration and shares it with the running server

mod state;
mod types;

use std::net::{AddrParseError, IpAddr, SocketAddr};

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

// Re-export public types
pub use state::AppState;
pub use types::{
    AccessPointConfig, Config, LogFormat, LogLevel, LoggingConfig, ServerConfig, Strategy,
};

/// Prefix of environment overrides, e.g. `APLOG_SERVER__PORT`
const ENV_PREFIX: &str = "APLOG";

/// Largest accepted `server.read_chunk`
const MAX_READ_CHUNK: usize = 64 * 1024;

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env_prefix(config_path, ENV_PREFIX)
    }

    /// File, then `<prefix>_SECTION__KEY` environment variables, then defaults
    fn load_with_env_prefix(config_path: &str, env_prefix: &str) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            );

        with_defaults(builder)?.build()?.try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        with_defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.server.host.parse()?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn effective_backlog(&self) -> i32 {
        self.server
            .backlog
            .unwrap_or_else(|| self.server.strategy.default_backlog())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;
        if server.read_chunk == 0 || server.read_chunk > MAX_READ_CHUNK {
            return Err(ConfigError::Message(format!(
                "server.read_chunk must be within 1..={MAX_READ_CHUNK}, got {}",
                server.read_chunk
            )));
        }
        if server.max_connections == 0 {
            return Err(ConfigError::Message(
                "server.max_connections must be at least 1".to_string(),
            ));
        }
        if let Some(backlog) = server.backlog {
            if backlog < 1 {
                return Err(ConfigError::Message(format!(
                    "server.backlog must be at least 1, got {backlog}"
                )));
            }
        }
        if server.workers == Some(0) {
            return Err(ConfigError::Message(
                "server.workers must be at least 1 when set".to_string(),
            ));
        }
        self.access_point
            .validate()
            .map_err(|e| ConfigError::Message(format!("access_point: {e}")))
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 6666)?
        .set_default("server.strategy", Strategy::default().as_str())?
        .set_default("server.max_connections", 8)?
        .set_default("server.read_chunk", 127)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.log_payload", true)?
        .set_default("access_point.ssid", "ESP32_AP")?
        .set_default("access_point.password", "")?
        .set_default("access_point.max_stations", 3)?
        .set_default("access_point.channel", 1)
}
