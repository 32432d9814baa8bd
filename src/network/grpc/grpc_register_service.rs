//! tonic handlers of the backend. Requests are unpacked, answered by the
//! [`RegistrationService`] key by key, and every key that got no id is left out
//! of the response.

use std::sync::Arc;

use autometrics::autometrics;
use tonic::Request;
use tonic::Response;
use tonic::Status;
use tracing::debug;
use tracing::warn;

use crate::constants::NONE;
use crate::proto::instance_ping_service_server::InstancePingService;
use crate::proto::register_service_server::RegisterService;
use crate::proto::EndpointMapping;
use crate::proto::EndpointRegisterRequest;
use crate::proto::EndpointRegisterResponse;
use crate::proto::InstanceMapping;
use crate::proto::InstancePingRequest;
use crate::proto::InstancePingResponse;
use crate::proto::InstanceRegisterRequest;
use crate::proto::InstanceRegisterResponse;
use crate::proto::NetworkAddressMapping;
use crate::proto::NetworkAddressRegisterRequest;
use crate::proto::NetworkAddressRegisterResponse;
use crate::proto::ServiceMapping;
use crate::proto::ServiceRegisterRequest;
use crate::proto::ServiceRegisterResponse;
use crate::proto::SpanType;
use crate::InstanceProperties;
use crate::RegistrationService;
use crate::API_SLO;

#[derive(Debug, Clone)]
pub struct RegisterRpcHandler {
    service: Arc<RegistrationService>,
}

impl RegisterRpcHandler {
    pub fn new(service: Arc<RegistrationService>) -> Self {
        Self { service }
    }

    pub fn registration_service(&self) -> &Arc<RegistrationService> {
        &self.service
    }
}

#[tonic::async_trait]
impl RegisterService for RegisterRpcHandler {
    #[cfg_attr(not(doc), autometrics(objective = API_SLO))]
    async fn register_services(
        &self,
        request: Request<ServiceRegisterRequest>,
    ) -> std::result::Result<Response<ServiceRegisterResponse>, Status> {
        let req = request.into_inner();
        debug!("register_services: {:?}", req.service_names);

        let services = req
            .service_names
            .into_iter()
            .filter_map(|service_name| {
                let service_id = self.service.register_service(&service_name);
                (service_id != NONE).then_some(ServiceMapping {
                    service_name,
                    service_id,
                })
            })
            .collect();
        Ok(Response::new(ServiceRegisterResponse { services }))
    }

    #[cfg_attr(not(doc), autometrics(objective = API_SLO))]
    async fn register_instances(
        &self,
        request: Request<InstanceRegisterRequest>,
    ) -> std::result::Result<Response<InstanceRegisterResponse>, Status> {
        let req = request.into_inner();
        debug!("register_instances: {} instance(s)", req.instances.len());

        let instances = req
            .instances
            .into_iter()
            .filter_map(|instance| {
                let properties = match InstanceProperties::from_json(&instance.instance_properties) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(
                            "instance {} sent unreadable properties, registering without: {:?}",
                            instance.instance_uuid, e
                        );
                        InstanceProperties::default()
                    }
                };
                let instance_id = self.service.register_instance(
                    instance.service_id,
                    &instance.instance_uuid,
                    instance.register_time,
                    properties,
                );
                (instance_id != NONE).then_some(InstanceMapping {
                    instance_uuid: instance.instance_uuid,
                    instance_id,
                })
            })
            .collect();
        Ok(Response::new(InstanceRegisterResponse { instances }))
    }

    #[cfg_attr(not(doc), autometrics(objective = API_SLO))]
    async fn register_endpoints(
        &self,
        request: Request<EndpointRegisterRequest>,
    ) -> std::result::Result<Response<EndpointRegisterResponse>, Status> {
        let req = request.into_inner();
        debug!("register_endpoints: {} endpoint(s)", req.endpoints.len());

        let endpoints = req
            .endpoints
            .into_iter()
            .filter_map(|endpoint| {
                let span_type = SpanType::from_wire(endpoint.span_type);
                let endpoint_id =
                    self.service
                        .register_endpoint(endpoint.service_id, &endpoint.endpoint_name, span_type);
                (endpoint_id != NONE).then_some(EndpointMapping {
                    service_id: endpoint.service_id,
                    endpoint_name: endpoint.endpoint_name,
                    endpoint_id,
                    span_type: span_type as i32,
                })
            })
            .collect();
        Ok(Response::new(EndpointRegisterResponse { endpoints }))
    }

    #[cfg_attr(not(doc), autometrics(objective = API_SLO))]
    async fn register_network_addresses(
        &self,
        request: Request<NetworkAddressRegisterRequest>,
    ) -> std::result::Result<Response<NetworkAddressRegisterResponse>, Status> {
        let req = request.into_inner();
        debug!("register_network_addresses: {:?}", req.addresses);

        let addresses = req
            .addresses
            .into_iter()
            .filter_map(|network_address| {
                let network_address_id = self.service.register_network_address(&network_address);
                (network_address_id != NONE).then_some(NetworkAddressMapping {
                    network_address,
                    network_address_id,
                })
            })
            .collect();
        Ok(Response::new(NetworkAddressRegisterResponse { addresses }))
    }
}

#[tonic::async_trait]
impl InstancePingService for RegisterRpcHandler {
    #[cfg_attr(not(doc), autometrics(objective = API_SLO))]
    async fn ping(
        &self,
        request: Request<InstancePingRequest>,
    ) -> std::result::Result<Response<InstancePingResponse>, Status> {
        let req = request.into_inner();
        let commands = self
            .service
            .heartbeat(req.instance_id, req.heartbeat_time, &req.instance_uuid);

        let instance_command = commands.to_json().map_err(|e| {
            warn!("failed to encode commands for instance {}: {:?}", req.instance_id, e);
            Status::internal("failed to encode commands")
        })?;
        Ok(Response::new(InstancePingResponse { instance_command }))
    }
}
