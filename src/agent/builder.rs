//! Wires an agent together from a [`RegisterConfig`].
//!
//! ```ignore
//! let mut agent = AgentBuilder::new(RegisterConfig::new()?.validate()?).build()?;
//! agent.boot();
//! let id = agent.dictionaries().endpoints().find_or_prepare_for_register(sid, "GET /", true, false);
//! agent.shutdown().await?;
//! ```

use std::sync::Arc;

use tracing::info;
use tracing::warn;

use super::AgentIdentity;
use super::CommandService;
use super::InstanceProperties;
use super::RegisterClient;
use crate::utils::async_task::PeriodicTask;
use crate::Dictionaries;
use crate::GrpcTransport;
use crate::RegisterConfig;
use crate::RegisterTransport;
use crate::Result;

pub struct AgentBuilder {
    config: RegisterConfig,
    transport: Option<Arc<dyn RegisterTransport>>,
    properties: Option<InstanceProperties>,
}

impl AgentBuilder {
    pub fn new(config: RegisterConfig) -> Self {
        Self {
            config,
            transport: None,
            properties: None,
        }
    }

    /// Loads and validates configuration from defaults, `CONFIG_PATH` and
    /// the environment.
    pub fn from_env() -> Result<Self> {
        let config = RegisterConfig::new()?.validate()?;
        Ok(Self::new(config))
    }

    /// Replaces the gRPC transport
    pub fn transport(
        mut self,
        transport: Arc<dyn RegisterTransport>,
    ) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the detected instance properties
    pub fn properties(
        mut self,
        properties: InstanceProperties,
    ) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Builds a stopped agent. Must be called from within a tokio runtime
    /// unless a transport was supplied.
    pub fn build(self) -> Result<Agent> {
        let agent_config = &self.config.agent;
        let identity = Arc::new(AgentIdentity::new(
            agent_config.service_name.clone(),
            &agent_config.instance_uuid,
        ));
        let dictionaries = Arc::new(Dictionaries::new(&self.config.dictionary));

        let transport: Arc<dyn RegisterTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(GrpcTransport::new(
                &agent_config.backend_addresses,
                &self.config.network,
                self.config.retry.clone(),
            )?),
        };
        let command_handler = Arc::new(CommandService::new(identity.clone(), dictionaries.clone()));
        let properties = self.properties.unwrap_or_else(InstanceProperties::detect);

        let client = Arc::new(RegisterClient::new(
            identity.clone(),
            dictionaries.clone(),
            transport,
            command_handler,
            properties,
            agent_config.cool_down_threshold(),
        ));

        Ok(Agent {
            config: self.config,
            identity,
            dictionaries,
            client,
            task: None,
        })
    }
}

/// Handle of a running (or not yet booted) agent
pub struct Agent {
    config: RegisterConfig,
    identity: Arc<AgentIdentity>,
    dictionaries: Arc<Dictionaries>,
    client: Arc<RegisterClient>,
    task: Option<PeriodicTask>,
}

impl Agent {
    /// Starts the register task. Booting twice is a no-op.
    pub fn boot(&mut self) {
        if self.task.is_some() {
            warn!("agent {} already booted", self.identity.service_name());
            return;
        }
        info!(
            "booting agent {} ({}) against {:?}",
            self.identity.service_name(),
            self.identity.instance_uuid(),
            self.config.agent.backend_addresses
        );
        self.task = Some(self.client.boot(self.config.agent.register_check_interval()));
    }

    /// Stops scheduling ticks and waits for an in-flight tick to finish
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.cancel();
            task.join().await?;
            info!("agent {} stopped", self.identity.service_name());
        }
        Ok(())
    }

    pub fn identity(&self) -> &Arc<AgentIdentity> {
        &self.identity
    }

    pub fn dictionaries(&self) -> &Arc<Dictionaries> {
        &self.dictionaries
    }

    pub fn register_client(&self) -> &Arc<RegisterClient> {
        &self.client
    }

    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }
}
