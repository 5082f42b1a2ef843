//! Configuration for servctl
//!
//! Centralized configuration with sensible defaults. One `Config` carries both
//! the server and the client settings; each side reads only its own section.

use std::time::Duration;

use crate::error::{Result, ServctlError};
use crate::protocol::MAX_MESSAGE_LENGTH;

/// Main configuration for a servctl server or client
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Password a client must send before its session is authenticated
    pub secret: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Interval between unsolicited diagnostic frames (milliseconds)
    pub diagnostic_interval_ms: u64,

    /// Delay before the first diagnostic frame of a connection (milliseconds)
    pub diagnostic_initial_delay_ms: u64,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Client Configuration
    // -------------------------------------------------------------------------
    /// Address of the server to control (host:port)
    pub server_addr: String,

    /// TCP connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// How long a command waits for its reply (milliseconds, 0 = forever)
    pub reply_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            secret: "password".to_string(),
            max_connections: 64,
            diagnostic_interval_ms: 5_000,
            diagnostic_initial_delay_ms: 20_000,
            read_timeout_ms: 0,
            write_timeout_ms: 5_000,
            server_addr: "127.0.0.1:8080".to_string(),
            connect_timeout_ms: 5_000,
            reply_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings that would otherwise fail deep inside a session
    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            return Err(ServctlError::Config("secret must not be empty".to_string()));
        }
        if self.secret.len() > MAX_MESSAGE_LENGTH {
            return Err(ServctlError::Config(format!(
                "secret is {} bytes, longer than the {} byte frame limit",
                self.secret.len(),
                MAX_MESSAGE_LENGTH
            )));
        }
        if self.diagnostic_interval_ms == 0 {
            return Err(ServctlError::Config(
                "diagnostic interval must be greater than zero".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ServctlError::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn diagnostic_interval(&self) -> Duration {
        Duration::from_millis(self.diagnostic_interval_ms)
    }

    pub fn diagnostic_initial_delay(&self) -> Duration {
        Duration::from_millis(self.diagnostic_initial_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Reply deadline, or `None` when commands should wait indefinitely
    pub fn reply_timeout(&self) -> Option<Duration> {
        (self.reply_timeout_ms > 0).then(|| Duration::from_millis(self.reply_timeout_ms))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the password the server accepts
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = secret.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the diagnostic push interval (in milliseconds)
    pub fn diagnostic_interval_ms(mut self, ms: u64) -> Self {
        self.config.diagnostic_interval_ms = ms;
        self
    }

    /// Set the delay before the first diagnostic push (in milliseconds)
    pub fn diagnostic_initial_delay_ms(mut self, ms: u64) -> Self {
        self.config.diagnostic_initial_delay_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the server address the client connects to
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the reply timeout (in milliseconds, 0 waits forever)
    pub fn reply_timeout_ms(mut self, ms: u64) -> Self {
        self.config.reply_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
