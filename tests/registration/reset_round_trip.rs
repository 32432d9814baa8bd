use apm_register::ClientState;
use apm_register::NetworkAddressKey;
use apm_register::PossibleFound;

use crate::commons::agent_config;
use crate::commons::build_agent;
use crate::commons::Backend;
use crate::enable_logger;

#[tokio::test]
async fn test_backend_reset_sends_agent_into_cooldown() {
    enable_logger();
    let backend = Backend::start().await.unwrap();
    let agent = build_agent(agent_config("orders", backend.port, 10)).unwrap();
    let client = agent.register_client();
    let identity = agent.identity();

    client.tick().await;
    assert_eq!(identity.state(), ClientState::Registered);
    let service_id = identity.service_id();
    let old_instance_id = identity.instance_id();

    // Resolve one network address so the reset has something to drop
    let addresses = agent.dictionaries().network_addresses();
    addresses.find_or_register(NetworkAddressKey::new("cache:6379"));
    client.tick().await;
    assert!(addresses.find(&NetworkAddressKey::new("cache:6379")).is_found());

    // Backend loses its instance inventory
    assert_eq!(backend.service.forget_instances(), 1);
    client.tick().await;

    assert_eq!(identity.state(), ClientState::InstanceUnresolved);
    assert_eq!(identity.service_id(), service_id);
    assert!(identity.cool_down_start() > 0);
    assert_eq!(
        addresses.find(&NetworkAddressKey::new("cache:6379")),
        PossibleFound::NotFound
    );

    // Cooling down: nothing is sent
    client.tick().await;
    assert_eq!(identity.state(), ClientState::InstanceUnresolved);
    assert!(backend.service.instance(old_instance_id).is_none());

    backend.stop();
}
