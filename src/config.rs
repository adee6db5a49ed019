//! Configuration management for the SmallChat server
//!
//! Values come from built-in defaults, an optional `smallchat.toml` in the
//! working directory, and `SMALLCHAT_*` environment variables, in that order.

use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::time::Duration;

/// Default TCP port the chat server listens on.
pub const DEFAULT_PORT: u16 = 7711;

/// Default maximum number of simultaneously connected clients.
pub const DEFAULT_MAX_CLIENTS: usize = 1000;

/// Server configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// IP address to bind the listening socket to
    pub bind_address: String,

    /// TCP port for the listening socket (0 picks an ephemeral port)
    pub port: u16,

    /// Upper bound on live clients in the connection table
    pub max_clients: usize,

    /// How long one wait on the poller may block before a no-op tick
    pub poll_timeout_ms: u64,

    /// Longest nickname accepted by `/nick`, in characters
    pub max_nick_length: usize,

    /// Longest pending input line before it is flushed as-is, in bytes
    pub max_line_length: usize,

    /// Capacity of one formatted outbound message, in bytes
    pub max_message_length: usize,

    /// Size of the scratch buffer used for each socket read
    pub read_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            poll_timeout_ms: 1000,
            max_nick_length: 32,
            max_line_length: 256,
            max_message_length: 512,
            read_buffer_size: 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, `smallchat.toml` and `SMALLCHAT_*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Self::builder_with_defaults()?
            .add_source(File::with_name("smallchat").required(false))
            .add_source(Environment::with_prefix("SMALLCHAT").try_parsing(true))
            .build()?;

        Self::from_settings(settings)
    }

    /// Deserialize and validate loaded settings.
    ///
    /// Port 0 is refused here: an ephemeral port is only useful to configs
    /// built in code, never to a deployed server.
    fn from_settings(settings: Config) -> Result<Self, config::ConfigError> {
        let config: ServerConfig = settings.try_deserialize()?;

        if config.port == 0 {
            return Err(config::ConfigError::Message(
                "port must be greater than 0".into(),
            ));
        }

        config.validate()?;
        Ok(config)
    }

    /// Config builder pre-populated with every key from `ServerConfig::default`
    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("poll_timeout_ms", defaults.poll_timeout_ms as i64)?
            .set_default("max_nick_length", defaults.max_nick_length as i64)?
            .set_default("max_line_length", defaults.max_line_length as i64)?
            .set_default("max_message_length", defaults.max_message_length as i64)?
            .set_default("read_buffer_size", defaults.read_buffer_size as i64)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_nick_length == 0 {
            return Err(config::ConfigError::Message(
                "max_nick_length must be greater than 0".into(),
            ));
        }

        if self.max_line_length == 0 || self.read_buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "max_line_length and read_buffer_size must be greater than 0".into(),
            ));
        }

        // A chat line carries "<nick>> " in front of the text and a trailing newline.
        if self.max_message_length <= self.max_nick_length + 3 {
            return Err(config::ConfigError::Message(
                "max_message_length must leave room for a nickname prefix".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get the poll timeout as Duration
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}
