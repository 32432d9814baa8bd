use std::fmt::Debug;
use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Identity and register-loop settings of an agent
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AgentConfig {
    /// Logical service name this agent reports as. Must be unique in the
    /// backend namespace and non-empty.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Stable instance UUID. Left empty, one is generated at boot and kept in
    /// memory for the process lifetime.
    #[serde(default)]
    pub instance_uuid: String,

    /// Backend register addresses, `host:port`. One is picked at random for
    /// every request.
    #[serde(default = "default_backend_addresses")]
    pub backend_addresses: Vec<String>,

    /// Period of the register task, the first tick fires immediately
    #[serde(default = "default_register_check_interval_in_secs")]
    pub register_check_interval_in_secs: u64,

    /// How long a cooling-down agent withholds all register and heartbeat
    /// traffic
    #[serde(default = "default_cool_down_threshold_in_mins")]
    pub cool_down_threshold_in_mins: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            instance_uuid: String::new(),
            backend_addresses: default_backend_addresses(),
            register_check_interval_in_secs: default_register_check_interval_in_secs(),
            cool_down_threshold_in_mins: default_cool_down_threshold_in_mins(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "agent.service_name must not be empty".into(),
            )));
        }

        if self.register_check_interval_in_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "agent.register_check_interval_in_secs must be greater than 0".into(),
            )));
        }

        if let Some(addr) = self.backend_addresses.iter().find(|a| a.trim().is_empty()) {
            return Err(Error::Config(ConfigError::Message(format!(
                "agent.backend_addresses contains an empty entry: {addr:?}"
            ))));
        }

        Ok(())
    }

    pub fn register_check_interval(&self) -> Duration {
        Duration::from_secs(self.register_check_interval_in_secs)
    }

    pub fn cool_down_threshold(&self) -> Duration {
        Duration::from_secs(self.cool_down_threshold_in_mins * 60)
    }
}

fn default_service_name() -> String {
    "Your_ApplicationName".to_string()
}
fn default_backend_addresses() -> Vec<String> {
    vec!["127.0.0.1:11800".to_string()]
}
fn default_register_check_interval_in_secs() -> u64 {
    3
}
fn default_cool_down_threshold_in_mins() -> u64 {
    10
}
