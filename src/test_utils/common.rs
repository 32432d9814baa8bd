use crate::proto::EndpointMapping;
use crate::proto::InstanceMapping;
use crate::proto::InstanceRegisterResponse;
use crate::proto::ServiceMapping;
use crate::proto::ServiceRegisterResponse;
use crate::proto::SpanType;
use crate::RegisterConfig;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Agent config pointing at `127.0.0.1:port`, with short retry policies
pub(crate) fn agent_config(
    service_name: &str,
    port: u16,
) -> RegisterConfig {
    let mut config = RegisterConfig::default();
    config.agent.service_name = service_name.to_string();
    config.agent.backend_addresses = vec![format!("127.0.0.1:{port}")];
    config.agent.register_check_interval_in_secs = 1;
    config.retry.register.max_retries = 1;
    config.retry.register.timeout_ms = 1000;
    config.retry.heartbeat.max_retries = 1;
    config.retry.heartbeat.timeout_ms = 1000;
    config
}

pub(crate) fn service_response(
    service_name: &str,
    service_id: i32,
) -> ServiceRegisterResponse {
    ServiceRegisterResponse {
        services: vec![ServiceMapping {
            service_name: service_name.to_string(),
            service_id,
        }],
    }
}

pub(crate) fn instance_response(
    instance_uuid: &str,
    instance_id: i32,
) -> InstanceRegisterResponse {
    InstanceRegisterResponse {
        instances: vec![InstanceMapping {
            instance_uuid: instance_uuid.to_string(),
            instance_id,
        }],
    }
}

pub(crate) fn endpoint_mapping(
    service_id: i32,
    endpoint_name: &str,
    span_type: SpanType,
    endpoint_id: i32,
) -> EndpointMapping {
    EndpointMapping {
        service_id,
        endpoint_name: endpoint_name.to_string(),
        endpoint_id,
        span_type: span_type as i32,
    }
}
