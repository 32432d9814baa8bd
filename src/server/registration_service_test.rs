use std::sync::Arc;

use super::*;
use crate::constants::NONE;
use crate::proto::SpanType;
use crate::Command;
use crate::InstanceProperties;

fn props(pid: &str, host: &str) -> InstanceProperties {
    InstanceProperties {
        host_name: Some(host.to_string()),
        process_no: Some(pid.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_register_service_is_idempotent() {
    let service = RegistrationService::new();

    let id = service.register_service("orders");
    assert!(id > NONE);
    assert_eq!(service.register_service("orders"), id);
    assert_ne!(service.register_service("billing"), id);
    assert_eq!(service.service(id).unwrap().name, "orders");
}

#[test]
fn test_concurrent_service_registration_allocates_one_id() {
    let service = Arc::new(RegistrationService::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let s = service.clone();
            std::thread::spawn(move || s.register_service("orders"))
        })
        .collect();

    let ids: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
}

#[test]
fn test_empty_names_are_rejected() {
    let service = RegistrationService::new();
    let sid = service.register_service("orders");

    assert_eq!(service.register_service(""), NONE);
    assert_eq!(service.register_instance(sid, "", 0, InstanceProperties::default()), NONE);
    assert_eq!(service.register_endpoint(sid, "", SpanType::Entry), NONE);
    assert_eq!(service.register_network_address(""), NONE);
}

#[test]
fn test_register_instance_builds_display_name() {
    let service = RegistrationService::new();
    let sid = service.register_service("orders");

    let id = service.register_instance(sid, "uuid-1", 1000, props("4242", "web-1"));
    let record = service.instance(id).unwrap();

    assert_eq!(record.name, "orders-pid:4242@web-1");
    assert_eq!(record.service_id, sid);
    assert_eq!(record.register_time, 1000);

    // Same key, different properties: still the same instance
    assert_eq!(service.register_instance(sid, "uuid-1", 2000, props("1", "other")), id);
    assert_eq!(service.instance(id).unwrap().register_time, 1000);
}

#[test]
fn test_register_instance_of_unknown_service() {
    let service = RegistrationService::new();
    assert_eq!(service.register_instance(77, "uuid-1", 0, InstanceProperties::default()), NONE);
}

#[test]
fn test_instances_are_keyed_by_service_and_uuid() {
    let service = RegistrationService::new();
    let a = service.register_service("a");
    let b = service.register_service("b");

    let ia = service.register_instance(a, "same-uuid", 0, InstanceProperties::default());
    let ib = service.register_instance(b, "same-uuid", 0, InstanceProperties::default());
    assert_ne!(ia, ib);
}

#[test]
fn test_endpoint_directions_are_distinct() {
    let service = RegistrationService::new();
    let sid = service.register_service("orders");

    let entry = service.register_endpoint(sid, "foo", SpanType::Entry);
    let exit = service.register_endpoint(sid, "foo", SpanType::Exit);
    let unknown = service.register_endpoint(sid, "foo", SpanType::Unrecognized);

    assert_ne!(entry, exit);
    assert_ne!(entry, unknown);
    assert_eq!(service.register_endpoint(sid, "foo", SpanType::Entry), entry);
    assert_eq!(service.endpoint(exit).unwrap().span_type, SpanType::Exit);
}

#[test]
fn test_register_network_address() {
    let service = RegistrationService::new();

    let id = service.register_network_address("10.0.0.1:3306");
    assert_eq!(service.register_network_address("10.0.0.1:3306"), id);
    assert_eq!(service.network_address(id).unwrap().address, "10.0.0.1:3306");
}

#[test]
fn test_heartbeat_refreshes_instance_and_service() {
    let service = RegistrationService::new();
    let sid = service.register_service("orders");
    let iid = service.register_instance(sid, "uuid-1", 1000, InstanceProperties::default());

    let commands = service.heartbeat(iid, 5000, "uuid-1");

    assert!(commands.is_empty());
    assert_eq!(service.instance(iid).unwrap().heartbeat_time, 5000);
    assert_eq!(service.service_heartbeat(sid), Some(5000));
}

#[test]
fn test_heartbeat_of_unknown_instance_returns_reset() {
    let service = RegistrationService::new();

    let commands = service.heartbeat(42, 5000, "uuid-x");

    assert_eq!(commands.commands.len(), 1);
    match &commands.commands[0] {
        Command::Reset(reset) => {
            assert_eq!(reset.instance_id, 42);
            assert_eq!(reset.heartbeat_time, 5000);
            assert_eq!(reset.instance_uuid, "uuid-x");
            assert!(!reset.serial_number.is_empty());
        }
        other => panic!("unexpected command {other:?}"),
    }

    // serial numbers differ between resets
    let again = service.heartbeat(42, 6000, "uuid-x");
    assert_ne!(again.commands[0].serial_number(), commands.commands[0].serial_number());
}

#[test]
fn test_forgotten_instance_is_reset_and_re_registered_with_new_id() {
    let service = RegistrationService::new();
    let sid = service.register_service("orders");
    let iid = service.register_instance(sid, "uuid-1", 1000, InstanceProperties::default());

    assert_eq!(service.forget_instances(), 1);
    assert!(!service.heartbeat(iid, 2000, "uuid-1").is_empty());

    let new_id = service.register_instance(sid, "uuid-1", 3000, InstanceProperties::default());
    assert_ne!(new_id, iid);
    assert!(service.heartbeat(new_id, 4000, "uuid-1").is_empty());
}
