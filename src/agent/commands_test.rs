use std::sync::Arc;

use super::*;
use crate::constants::NONE;
use crate::proto::NetworkAddressMapping;
use crate::proto::NetworkAddressRegisterResponse;
use crate::Dictionaries;
use crate::DictionaryConfig;
use crate::MockRegisterTransport;
use crate::NetworkAddressKey;
use crate::PossibleFound;

fn reset(serial: &str) -> Command {
    Command::Reset(ResetCommand {
        serial_number: serial.to_string(),
        instance_id: 42,
        heartbeat_time: 1000,
        instance_uuid: "u".to_string(),
    })
}

#[test]
fn test_commands_json() {
    let commands = Commands::single(reset("s-1"));
    let json = commands.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["commands"][0]["command"], "reset");
    assert_eq!(value["commands"][0]["instance_id"], 42);
    assert_eq!(Commands::from_json(&json).unwrap(), commands);
}

#[test]
fn test_unknown_commands_and_empty_payloads() {
    let commands = Commands::from_json(r#"{"commands":[{"command":"profile_task","task_id":"x"}]}"#).unwrap();
    assert_eq!(commands.commands, vec![Command::Unknown]);
    assert_eq!(Command::Unknown.serial_number(), None);

    assert!(Commands::from_json("").unwrap().is_empty());
    assert!(Commands::from_json("{}").unwrap().is_empty());
    assert!(Commands::from_json("nope").is_err());
}

fn service() -> (CommandService, Arc<AgentIdentity>, Arc<Dictionaries>) {
    let identity = Arc::new(AgentIdentity::new("orders", "u"));
    let dictionaries = Arc::new(Dictionaries::new(&DictionaryConfig::default()));
    let service = CommandService::new(identity.clone(), dictionaries.clone());
    (service, identity, dictionaries)
}

#[tokio::test]
async fn test_reset_cools_down_resets_instance_and_clears_addresses() {
    let (service, identity, dictionaries) = service();
    identity.set_service_id(7);
    identity.set_instance(42, 1);

    let addresses = dictionaries.network_addresses();
    addresses.find_or_register(NetworkAddressKey::new("db:5432"));
    let mut transport = MockRegisterTransport::new();
    transport.expect_register_network_addresses().returning(|_| {
        Ok(NetworkAddressRegisterResponse {
            addresses: vec![NetworkAddressMapping {
                network_address: "db:5432".to_string(),
                network_address_id: 3,
            }],
        })
    });
    addresses.sync(&transport).await.unwrap();
    assert_eq!(addresses.find(&NetworkAddressKey::new("db:5432")), PossibleFound::Found(3));

    service.receive(Commands::single(reset("s-1")));

    assert_eq!(identity.instance_id(), NONE);
    assert_eq!(identity.service_id(), 7);
    assert!(identity.cool_down_start() > 0);
    assert!(addresses.is_empty());
}

#[test]
fn test_duplicate_serial_numbers_execute_once() {
    let (service, identity, _) = service();
    identity.set_service_id(7);
    identity.set_instance(42, 1);

    service.receive(Commands::single(reset("s-1")));
    assert_eq!(identity.instance_id(), NONE);

    identity.set_instance(43, 2);
    service.receive(Commands {
        commands: vec![reset("s-1"), Command::Unknown],
    });
    assert_eq!(identity.instance_id(), 43);

    service.receive(Commands::single(reset("s-2")));
    assert_eq!(identity.instance_id(), NONE);
}

#[test]
fn test_serial_number_cache_is_bounded() {
    let mut cache = SerialNumberCache::new(2);
    assert!(cache.insert("a"));
    assert!(!cache.insert("a"));
    assert!(cache.insert("b"));
    assert!(cache.insert("c"));

    // "a" was evicted
    assert!(cache.insert("a"));
    assert!(!cache.insert("c"));
}
