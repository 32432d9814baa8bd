use apm_register::proto::SpanType;
use apm_register::ClientState;
use apm_register::NetworkAddressKey;
use apm_register::PossibleFound;

use crate::commons::agent_config;
use crate::commons::build_agent;
use crate::commons::Backend;
use crate::enable_logger;

#[tokio::test]
async fn test_agent_registers_then_resolves_endpoints() {
    enable_logger();
    let backend = Backend::start().await.unwrap();
    let agent = build_agent(agent_config("orders", backend.port, 2)).unwrap();
    let client = agent.register_client();
    let identity = agent.identity();

    // Tick 1: service and instance
    client.tick().await;
    assert_eq!(identity.state(), ClientState::Registered);
    let service_id = identity.service_id();
    let record = backend.service.instance(identity.instance_id()).unwrap();
    assert_eq!(record.name, "orders-pid:4242@web-1");
    assert_eq!(record.service_id, service_id);

    // Tracing discovers endpoints between ticks
    let endpoints = agent.dictionaries().endpoints();
    assert_eq!(
        endpoints.find_or_prepare_for_register(service_id, "POST /checkout", true, false),
        PossibleFound::NotFound
    );
    assert_eq!(
        endpoints.find_or_prepare_for_register(service_id, "GET /inventory", false, true),
        PossibleFound::NotFound
    );
    assert_eq!(
        endpoints.find_or_prepare_for_register(service_id, "GET /health", true, false),
        PossibleFound::NotFound
    );
    assert_eq!(endpoints.pending_len(), 2);

    // Tick 2: heartbeat and endpoint sync
    client.tick().await;
    let checkout = endpoints.find_or_prepare_for_register(service_id, "POST /checkout", true, false);
    let inventory = endpoints.find_or_prepare_for_register(service_id, "GET /inventory", false, true);
    assert!(checkout.is_found());
    assert!(inventory.is_found());
    assert_ne!(checkout.id_or_none(), inventory.id_or_none());
    assert_eq!(
        backend.service.endpoint(inventory.id_or_none()).unwrap().span_type,
        SpanType::Exit
    );
    assert!(backend.service.service_heartbeat(service_id).is_some());

    // The dropped endpoint is still over capacity
    assert_eq!(
        endpoints.find_or_prepare_for_register(service_id, "GET /health", true, false),
        PossibleFound::NotFound
    );
    assert_eq!(endpoints.pending_len(), 0);

    backend.stop();
}

#[tokio::test]
async fn test_network_addresses_resolve_on_heartbeat() {
    enable_logger();
    let backend = Backend::start().await.unwrap();
    let agent = build_agent(agent_config("billing", backend.port, 10)).unwrap();

    agent.register_client().tick().await;
    let addresses = agent.dictionaries().network_addresses();
    assert_eq!(
        addresses.find_or_register(NetworkAddressKey::new("db:5432")),
        PossibleFound::NotFound
    );

    agent.register_client().tick().await;
    let found = addresses.find(&NetworkAddressKey::new("db:5432"));
    assert!(found.is_found());
    assert_eq!(
        backend.service.network_address(found.id_or_none()).unwrap().address,
        "db:5432"
    );

    backend.stop();
}

#[tokio::test]
async fn test_agents_of_same_service_share_service_id() {
    enable_logger();
    let backend = Backend::start().await.unwrap();
    let a = build_agent(agent_config("orders", backend.port, 10)).unwrap();
    let b = build_agent(agent_config("orders", backend.port, 10)).unwrap();

    a.register_client().tick().await;
    b.register_client().tick().await;

    assert_eq!(a.identity().service_id(), b.identity().service_id());
    assert_ne!(a.identity().instance_id(), b.identity().instance_id());

    backend.stop();
}

#[tokio::test]
async fn test_unreachable_backend_leaves_agent_unresolved() {
    enable_logger();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let agent = build_agent(agent_config("orders", port, 10)).unwrap();
    agent.register_client().tick().await;

    assert_eq!(agent.identity().state(), ClientState::ServiceUnresolved);
}
