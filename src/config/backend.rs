use std::net::SocketAddr;
use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Settings of the backend register server
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    /// gRPC listen address for register and ping requests
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Directory of the rolling log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            log_dir: default_log_dir(),
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<()> {
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_address.parse().map_err(|e| {
            Error::Config(ConfigError::Message(format!(
                "backend.listen_address {:?} is not a socket address: {}",
                self.listen_address, e
            )))
        })
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:11800".to_string()
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}
