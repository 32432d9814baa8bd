//! Configuration management for the registration agent and backend.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod agent;
mod backend;
mod dictionary;
mod monitoring;
mod network;
mod retry;
pub use agent::*;
pub use backend::*;
pub use dictionary::*;
pub use monitoring::*;
pub use network::*;
pub use retry::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Prefix of environment overrides, e.g. `APM__AGENT__SERVICE_NAME=orders`
pub const ENV_PREFIX: &str = "APM";

/// Main configuration container shared by the agent and the backend.
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct RegisterConfig {
    /// Agent identity and register loop settings
    #[serde(default)]
    pub agent: AgentConfig,
    /// Dictionary cache capacities
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    /// Network communication parameters
    #[serde(default)]
    pub network: NetworkConfig,
    /// Retry policies for register and heartbeat RPCs
    #[serde(default)]
    pub retry: RetryPolicies,
    /// Backend listener settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Metrics endpoint settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl Debug for RegisterConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RegisterConfig")
            .field("agent", &self.agent)
            .field("backend", &self.backend)
            .finish()
    }
}

impl RegisterConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `APM__` prefix (highest priority)
    ///
    /// Validation is deferred so further overrides can be applied with
    /// `with_override_config()`. Callers must call `validate()` before use.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.agent.validate()?;
        self.dictionary.validate()?;
        self.network.validate()?;
        self.retry.validate()?;
        let register_addr = self.backend.socket_addr()?;
        self.monitoring.validate(register_addr.port())?;
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("agent.backend_addresses")
}
