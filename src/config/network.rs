use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Network configuration for the register channel between agents and backend.
///
/// The same parameters tune both ends: agents use them for their lazily
/// connected client channels, the backend for its gRPC listener.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    /// Register and ping connections
    #[serde(default)]
    pub connection: ConnectionParams,

    /// Common TCP setting for all connections
    #[serde(default = "default_tcp_nodelay")]
    pub tcp_nodelay: bool,

    /// Gzip request and response bodies
    #[serde(default = "default_enable_compression")]
    pub enable_compression: bool,
}

/// Low-level network parameters for a connection
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectionParams {
    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_in_ms: u64,

    /// gRPC request completion timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_in_ms: u64,

    /// Max concurrent requests per connection (server side)
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// TCP keepalive in seconds
    #[serde(default = "default_tcp_keepalive")]
    pub tcp_keepalive_in_secs: u64,

    /// HTTP2 keepalive ping interval in seconds
    #[serde(default = "default_h2_keepalive_interval")]
    pub http2_keep_alive_interval_in_secs: u64,

    /// HTTP2 keepalive timeout in seconds
    #[serde(default = "default_h2_keepalive_timeout")]
    pub http2_keep_alive_timeout_in_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionParams::default(),
            tcp_nodelay: default_tcp_nodelay(),
            enable_compression: default_enable_compression(),
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            connect_timeout_in_ms: default_connect_timeout(),
            request_timeout_in_ms: default_request_timeout(),
            concurrency_limit: default_concurrency_limit(),
            tcp_keepalive_in_secs: default_tcp_keepalive(),
            http2_keep_alive_interval_in_secs: default_h2_keepalive_interval(),
            http2_keep_alive_timeout_in_secs: default_h2_keepalive_timeout(),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        self.connection.validate("connection")
    }
}

impl ConnectionParams {
    /// Type-specific validation with context for error messages
    pub(crate) fn validate(
        &self,
        conn_type: &str,
    ) -> Result<()> {
        if self.connect_timeout_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(format!(
                "{conn_type} connection timeout must be > 0",
            ))));
        }

        if self.request_timeout_in_ms <= self.connect_timeout_in_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "{} request timeout {}ms must exceed connect timeout {}ms",
                conn_type, self.request_timeout_in_ms, self.connect_timeout_in_ms
            ))));
        }

        if self.concurrency_limit == 0 {
            return Err(Error::Config(ConfigError::Message(format!(
                "{conn_type} concurrency limit must be > 0",
            ))));
        }

        if self.http2_keep_alive_timeout_in_secs >= self.http2_keep_alive_interval_in_secs {
            return Err(Error::Config(ConfigError::Message(format!(
                "{} keepalive timeout {}s must be < interval {}s",
                conn_type, self.http2_keep_alive_timeout_in_secs, self.http2_keep_alive_interval_in_secs
            ))));
        }

        Ok(())
    }
}

fn default_connect_timeout() -> u64 {
    1000
}
fn default_request_timeout() -> u64 {
    3000
}
fn default_concurrency_limit() -> usize {
    1024
}
fn default_tcp_nodelay() -> bool {
    true
}
fn default_enable_compression() -> bool {
    true
}
fn default_tcp_keepalive() -> u64 {
    300
}
fn default_h2_keepalive_interval() -> u64 {
    60
}
fn default_h2_keepalive_timeout() -> u64 {
    20
}
