//! Backend registries for services, instances, endpoints and network
//! addresses, plus instance liveness.

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Inventory;
use crate::constants::NONE;
use crate::constants::OP_ENDPOINT;
use crate::constants::OP_INSTANCE;
use crate::constants::OP_NETWORK_ADDRESS;
use crate::constants::OP_SERVICE;
use crate::proto::SpanType;
use crate::Command;
use crate::Commands;
use crate::InstanceProperties;
use crate::ResetCommand;
use crate::REGISTRATIONS_METRIC;
use crate::RESET_COMMANDS_METRIC;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub service_id: i32,
    pub name: String,
    pub heartbeat_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub instance_id: i32,
    pub service_id: i32,
    pub instance_uuid: String,
    /// `service_name[-pid:P][@host]`
    pub name: String,
    pub register_time: i64,
    pub heartbeat_time: i64,
    pub properties: InstanceProperties,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRecord {
    pub endpoint_id: i32,
    pub service_id: i32,
    pub name: String,
    pub span_type: SpanType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddressRecord {
    pub network_address_id: i32,
    pub address: String,
}

/// The backend half of the registration protocol.
///
/// Every `register_*` call is an idempotent get-or-create returning the id of
/// the name, or [`NONE`] when the request cannot be served (empty name,
/// unknown owning service). Callers omit `NONE` from their responses.
#[derive(Debug, Default)]
pub struct RegistrationService {
    services: Inventory<String, ServiceRecord>,
    instances: Inventory<(i32, String), InstanceRecord>,
    endpoints: Inventory<(i32, String, SpanType), EndpointRecord>,
    network_addresses: Inventory<String, NetworkAddressRecord>,
}

fn record_outcome(
    operation: &str,
    created: bool,
) {
    let outcome = if created { "created" } else { "existing" };
    REGISTRATIONS_METRIC.with_label_values(&[operation, outcome]).inc();
}

impl RegistrationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_service(
        &self,
        service_name: &str,
    ) -> i32 {
        if service_name.is_empty() {
            warn!("rejecting service with empty name");
            return NONE;
        }

        let (id, created) = self.services.get_or_create(service_name.to_string(), |id| ServiceRecord {
            service_id: id,
            name: service_name.to_string(),
            heartbeat_time: 0,
        });
        if created {
            info!("service {} registered as {}", service_name, id);
        }
        record_outcome(OP_SERVICE, created);
        id
    }

    pub fn register_instance(
        &self,
        service_id: i32,
        instance_uuid: &str,
        register_time: i64,
        properties: InstanceProperties,
    ) -> i32 {
        if instance_uuid.is_empty() {
            warn!("rejecting instance of service {} with empty uuid", service_id);
            return NONE;
        }
        let Some(service) = self.services.get(service_id) else {
            warn!("instance {} refers to unknown service {}", instance_uuid, service_id);
            return NONE;
        };

        let key = (service_id, instance_uuid.to_string());
        let (id, created) = self.instances.get_or_create(key, |id| InstanceRecord {
            instance_id: id,
            service_id,
            instance_uuid: instance_uuid.to_string(),
            name: properties.display_name(&service.name),
            register_time,
            heartbeat_time: register_time,
            properties,
        });
        if created {
            info!("instance {} of service {} registered as {}", instance_uuid, service.name, id);
        }
        record_outcome(OP_INSTANCE, created);
        id
    }

    pub fn register_endpoint(
        &self,
        service_id: i32,
        endpoint_name: &str,
        span_type: SpanType,
    ) -> i32 {
        if endpoint_name.is_empty() {
            warn!("rejecting endpoint of service {} with empty name", service_id);
            return NONE;
        }

        let key = (service_id, endpoint_name.to_string(), span_type);
        let (id, created) = self.endpoints.get_or_create(key, |id| EndpointRecord {
            endpoint_id: id,
            service_id,
            name: endpoint_name.to_string(),
            span_type,
        });
        if created {
            debug!("endpoint {} {:?} of service {} registered as {}", endpoint_name, span_type, service_id, id);
        }
        record_outcome(OP_ENDPOINT, created);
        id
    }

    pub fn register_network_address(
        &self,
        address: &str,
    ) -> i32 {
        if address.is_empty() {
            warn!("rejecting empty network address");
            return NONE;
        }

        let (id, created) = self
            .network_addresses
            .get_or_create(address.to_string(), |id| NetworkAddressRecord {
                network_address_id: id,
                address: address.to_string(),
            });
        if created {
            debug!("network address {} registered as {}", address, id);
        }
        record_outcome(OP_NETWORK_ADDRESS, created);
        id
    }

    /// Refreshes the liveness of a known instance and of its service. An
    /// unknown instance gets a reset command back.
    pub fn heartbeat(
        &self,
        instance_id: i32,
        heartbeat_time: i64,
        instance_uuid: &str,
    ) -> Commands {
        let service_id = self.instances.update(instance_id, |record| {
            record.heartbeat_time = heartbeat_time;
            record.service_id
        });

        match service_id {
            Some(service_id) => {
                self.services.update(service_id, |record| {
                    record.heartbeat_time = heartbeat_time;
                });
                debug!("heartbeat of instance {} at {}", instance_id, heartbeat_time);
                Commands::empty()
            }
            None => {
                warn!(
                    "heartbeat of unknown instance {} ({}), sending reset",
                    instance_id, instance_uuid
                );
                RESET_COMMANDS_METRIC.with_label_values(&["backend"]).inc();
                Commands::single(Command::Reset(ResetCommand {
                    serial_number: uuid::Uuid::new_v4().to_string(),
                    instance_id,
                    heartbeat_time,
                    instance_uuid: instance_uuid.to_string(),
                }))
            }
        }
    }

    // -
    // Lookups

    pub fn service(
        &self,
        service_id: i32,
    ) -> Option<ServiceRecord> {
        self.services.get(service_id)
    }

    pub fn service_heartbeat(
        &self,
        service_id: i32,
    ) -> Option<i64> {
        self.services.get(service_id).map(|s| s.heartbeat_time)
    }

    pub fn instance(
        &self,
        instance_id: i32,
    ) -> Option<InstanceRecord> {
        self.instances.get(instance_id)
    }

    pub fn endpoint(
        &self,
        endpoint_id: i32,
    ) -> Option<EndpointRecord> {
        self.endpoints.get(endpoint_id)
    }

    pub fn network_address(
        &self,
        network_address_id: i32,
    ) -> Option<NetworkAddressRecord> {
        self.network_addresses.get(network_address_id)
    }

    /// Drops every instance, as a backend restart without storage would
    pub fn forget_instances(&self) -> usize {
        let n = self.instances.len();
        self.instances.clear();
        n
    }
}
