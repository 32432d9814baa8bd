//! Wire types for the registration protocol.
//!
//! Messages are declared directly as prost structs; the tonic client and
//! server stubs for `RegisterService` and `InstancePingService` are generated
//! at build time from these types (see `build.rs`).

pub mod register_service {
    include!(concat!(env!("OUT_DIR"), "/apm.register.v1.RegisterService.rs"));
}

pub mod instance_ping_service {
    include!(concat!(env!("OUT_DIR"), "/apm.register.v1.InstancePingService.rs"));
}

pub use instance_ping_service::*;
pub use register_service::*;

/// Direction of an endpoint observation, carried as `int32` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SpanType {
    Entry = 0,
    Exit = 1,
    Unrecognized = -1,
}

impl SpanType {
    /// Lenient decoding: any number outside the known set is `Unrecognized`.
    pub fn from_wire(value: i32) -> Self {
        SpanType::try_from(value).unwrap_or(SpanType::Unrecognized)
    }
}

// -----------------------------------------------------------------------------
// register-service

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceRegisterRequest {
    #[prost(string, repeated, tag = "1")]
    pub service_names: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceMapping {
    #[prost(string, tag = "1")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub service_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceRegisterResponse {
    #[prost(message, repeated, tag = "1")]
    pub services: ::prost::alloc::vec::Vec<ServiceMapping>,
}

// -----------------------------------------------------------------------------
// register-instance

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstanceRegistration {
    #[prost(int32, tag = "1")]
    pub service_id: i32,
    #[prost(string, tag = "2")]
    pub instance_uuid: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub register_time: i64,
    /// JSON encoded list of `{key, value}` pairs.
    #[prost(string, tag = "4")]
    pub instance_properties: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstanceRegisterRequest {
    #[prost(message, repeated, tag = "1")]
    pub instances: ::prost::alloc::vec::Vec<InstanceRegistration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstanceMapping {
    #[prost(string, tag = "1")]
    pub instance_uuid: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub instance_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstanceRegisterResponse {
    #[prost(message, repeated, tag = "1")]
    pub instances: ::prost::alloc::vec::Vec<InstanceMapping>,
}

// -----------------------------------------------------------------------------
// ping

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstancePingRequest {
    #[prost(int32, tag = "1")]
    pub instance_id: i32,
    #[prost(int64, tag = "2")]
    pub heartbeat_time: i64,
    #[prost(string, tag = "3")]
    pub instance_uuid: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstancePingResponse {
    /// JSON encoded command batch.
    #[prost(string, tag = "1")]
    pub instance_command: ::prost::alloc::string::String,
}

// -----------------------------------------------------------------------------
// register-endpoint

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndpointRegistration {
    #[prost(int32, tag = "1")]
    pub service_id: i32,
    #[prost(string, tag = "2")]
    pub endpoint_name: ::prost::alloc::string::String,
    #[prost(enumeration = "SpanType", tag = "3")]
    pub span_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndpointRegisterRequest {
    #[prost(message, repeated, tag = "1")]
    pub endpoints: ::prost::alloc::vec::Vec<EndpointRegistration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndpointMapping {
    #[prost(int32, tag = "1")]
    pub service_id: i32,
    #[prost(string, tag = "2")]
    pub endpoint_name: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub endpoint_id: i32,
    #[prost(enumeration = "SpanType", tag = "4")]
    pub span_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndpointRegisterResponse {
    #[prost(message, repeated, tag = "1")]
    pub endpoints: ::prost::alloc::vec::Vec<EndpointMapping>,
}

// -----------------------------------------------------------------------------
// register-network-address

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NetworkAddressRegisterRequest {
    #[prost(string, repeated, tag = "1")]
    pub addresses: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NetworkAddressMapping {
    #[prost(string, tag = "1")]
    pub network_address: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub network_address_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NetworkAddressRegisterResponse {
    #[prost(message, repeated, tag = "1")]
    pub addresses: ::prost::alloc::vec::Vec<NetworkAddressMapping>,
}
