use tonic_build::manual::Builder;
use tonic_build::manual::Method;
use tonic_build::manual::Service;

const PACKAGE: &str = "apm.register.v1";
const CODEC: &str = "tonic::codec::ProstCodec";

fn unary(
    name: &str,
    route_name: &str,
    input_type: &str,
    output_type: &str,
) -> Method {
    Method::builder()
        .name(name)
        .route_name(route_name)
        .input_type(format!("crate::proto::{input_type}"))
        .output_type(format!("crate::proto::{output_type}"))
        .codec_path(CODEC)
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Messages are hand-written prost structs in src/proto, so only the
    // service stubs are generated here and no protoc is required.
    let register_service = Service::builder()
        .name("RegisterService")
        .package(PACKAGE)
        .method(unary(
            "register_services",
            "RegisterServices",
            "ServiceRegisterRequest",
            "ServiceRegisterResponse",
        ))
        .method(unary(
            "register_instances",
            "RegisterInstances",
            "InstanceRegisterRequest",
            "InstanceRegisterResponse",
        ))
        .method(unary(
            "register_endpoints",
            "RegisterEndpoints",
            "EndpointRegisterRequest",
            "EndpointRegisterResponse",
        ))
        .method(unary(
            "register_network_addresses",
            "RegisterNetworkAddresses",
            "NetworkAddressRegisterRequest",
            "NetworkAddressRegisterResponse",
        ))
        .build();

    let ping_service = Service::builder()
        .name("InstancePingService")
        .package(PACKAGE)
        .method(unary("ping", "Ping", "InstancePingRequest", "InstancePingResponse"))
        .build();

    Builder::new().compile(&[register_service, ping_service]);

    //autometrics: https://docs.autometrics.dev/rust/adding-version-information
    vergen::EmitBuilder::builder()
        .git_sha(true)
        .git_branch()
        .emit()
        .expect("Unable to generate build info");

    Ok(())
}
