//! The periodic task that drives an agent from unknown to registered and then
//! keeps it alive.
//!
//! Every tick walks the same ladder:
//! - cooling down: nothing is sent until the cooldown threshold elapsed
//! - service unresolved: register the service name
//! - instance unresolved: register this instance
//! - registered: heartbeat, run the returned commands, sync dictionaries
//!   unless a command started a cooldown
//!
//! Adopting a service id lets the same tick continue with instance
//! registration. Every other step ends the tick. A failure ends the tick too,
//! it is logged and the next scheduled tick starts over.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::error;
use tracing::info;

use super::AgentIdentity;
use super::ClientState;
use super::CommandHandler;
use super::Commands;
use super::InstanceProperties;
use crate::constants::NONE;
use crate::proto::InstancePingRequest;
use crate::proto::InstanceRegisterRequest;
use crate::proto::InstanceRegistration;
use crate::proto::ServiceRegisterRequest;
use crate::time::timestamp_millis;
use crate::utils::async_task::PeriodicTask;
use crate::Dictionaries;
use crate::RegisterTransport;
use crate::Result;
use crate::REGISTER_TICK_METRIC;

pub struct RegisterClient {
    identity: Arc<AgentIdentity>,
    dictionaries: Arc<Dictionaries>,
    transport: Arc<dyn RegisterTransport>,
    command_handler: Arc<dyn CommandHandler>,
    properties: InstanceProperties,
    cool_down_threshold: Duration,
}

impl RegisterClient {
    pub fn new(
        identity: Arc<AgentIdentity>,
        dictionaries: Arc<Dictionaries>,
        transport: Arc<dyn RegisterTransport>,
        command_handler: Arc<dyn CommandHandler>,
        properties: InstanceProperties,
        cool_down_threshold: Duration,
    ) -> Self {
        Self {
            identity,
            dictionaries,
            transport,
            command_handler,
            properties,
            cool_down_threshold,
        }
    }

    pub fn identity(&self) -> &Arc<AgentIdentity> {
        &self.identity
    }

    /// Suppresses all register and heartbeat traffic for the cooldown threshold
    pub fn cool_down(&self) {
        self.identity.cool_down();
    }

    /// Runs `tick` now and then every `period` until the returned task is
    /// cancelled.
    pub fn boot(
        self: &Arc<Self>,
        period: Duration,
    ) -> PeriodicTask {
        let client = self.clone();
        PeriodicTask::spawn("register_client", period, move || {
            let client = client.clone();
            async move { client.tick().await }
        })
    }

    /// One scheduled invocation. Never fails: errors end the tick and are
    /// logged.
    pub async fn tick(&self) {
        self.tick_at(timestamp_millis()).await
    }

    pub(crate) async fn tick_at(
        &self,
        now: i64,
    ) {
        if self.identity.is_cooling_down(now, self.cool_down_threshold) {
            info!(
                "{} is cooling down since {}, skip register",
                self.identity.service_name(),
                self.identity.cool_down_start()
            );
            REGISTER_TICK_METRIC.with_label_values(&["cooling_down"]).inc();
            return;
        }

        if let Err(e) = self.run(now).await {
            REGISTER_TICK_METRIC.with_label_values(&["failed"]).inc();
            error!("register tick of {} failed: {:?}", self.identity.service_name(), e);
        }
    }

    async fn run(
        &self,
        now: i64,
    ) -> Result<()> {
        let mut should_try = true;
        while should_try {
            should_try = false;
            match self.identity.state() {
                ClientState::ServiceUnresolved => {
                    should_try = self.register_service().await?;
                }
                ClientState::InstanceUnresolved => {
                    self.register_instance(now).await?;
                }
                ClientState::Registered => {
                    self.heartbeat(now).await?;
                }
            }
        }
        Ok(())
    }

    /// Returns whether a service id was adopted
    async fn register_service(&self) -> Result<bool> {
        let service_name = self.identity.service_name();
        let response = self
            .transport
            .register_services(ServiceRegisterRequest {
                service_names: vec![service_name.to_string()],
            })
            .await?;

        for mapping in response.services {
            if mapping.service_name == service_name && mapping.service_id != NONE {
                info!("service {} registered with id {}", service_name, mapping.service_id);
                self.identity.set_service_id(mapping.service_id);
                return Ok(true);
            }
        }
        debug!("service {} not resolved yet", service_name);
        Ok(false)
    }

    async fn register_instance(
        &self,
        now: i64,
    ) -> Result<()> {
        let instance_uuid = self.identity.instance_uuid();
        let request = InstanceRegisterRequest {
            instances: vec![InstanceRegistration {
                service_id: self.identity.service_id(),
                instance_uuid: instance_uuid.to_string(),
                register_time: now,
                instance_properties: self.properties.to_json()?,
            }],
        };
        let response = self.transport.register_instances(request).await?;

        for mapping in response.instances {
            if mapping.instance_uuid == instance_uuid && mapping.instance_id != NONE {
                info!(
                    "instance {} of service {} registered with id {}",
                    instance_uuid,
                    self.identity.service_id(),
                    mapping.instance_id
                );
                self.identity.set_instance(mapping.instance_id, now);
                return Ok(());
            }
        }
        debug!("instance {} not resolved yet", instance_uuid);
        Ok(())
    }

    async fn heartbeat(
        &self,
        now: i64,
    ) -> Result<()> {
        let response = self
            .transport
            .ping(InstancePingRequest {
                instance_id: self.identity.instance_id(),
                heartbeat_time: now,
                instance_uuid: self.identity.instance_uuid().to_string(),
            })
            .await?;

        let commands = Commands::from_json(&response.instance_command)?;
        if !commands.is_empty() {
            debug!("heartbeat returned {} command(s)", commands.commands.len());
            self.command_handler.receive(commands);

            // A command that started a cooldown silences the rest of this tick
            if self.identity.cool_down_start() > 0 {
                info!(
                    "{} started cooling down, skip dictionary sync",
                    self.identity.service_name()
                );
                return Ok(());
            }
        }

        let transport = self.transport.as_ref();
        self.dictionaries.network_addresses().sync(transport).await?;
        self.dictionaries.endpoints().sync(transport).await?;
        Ok(())
    }
}
