use super::*;

fn sample() -> InstanceProperties {
    InstanceProperties {
        host_name: Some("web-1".to_string()),
        os_name: Some("linux".to_string()),
        language: Some("rust".to_string()),
        process_no: Some("4242".to_string()),
        ipv4s: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
        other: vec![KeyStringValuePair::new("zone", "eu-1")],
    }
}

#[test]
fn test_pairs_keep_every_ipv4_and_unknown_keys() {
    let pairs = sample().to_pairs();

    assert_eq!(pairs.iter().filter(|p| p.key == "ipv4").count(), 2);
    assert!(pairs.contains(&KeyStringValuePair::new("process_no", "4242")));
    assert!(pairs.contains(&KeyStringValuePair::new("zone", "eu-1")));
    assert_eq!(InstanceProperties::from_pairs(pairs), sample());
}

#[test]
fn test_json_is_a_key_value_list() {
    let json = sample().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let list = value.as_array().unwrap();
    assert_eq!(list[0]["key"], "hostname");
    assert_eq!(list[0]["value"], "web-1");
    assert_eq!(InstanceProperties::from_json(&json).unwrap(), sample());
}

#[test]
fn test_from_json_edge_cases() {
    assert_eq!(InstanceProperties::from_json("").unwrap(), InstanceProperties::default());
    assert_eq!(InstanceProperties::default().to_json().unwrap(), "[]");
    assert!(InstanceProperties::from_json("{\"key\":").is_err());

    let props = InstanceProperties::from_json(r#"[{"key":"process_no","value":"abc"}]"#).unwrap();
    assert_eq!(props.process_no.as_deref(), Some("abc"));
    assert!(props.other.is_empty());
}

#[test]
fn test_display_name() {
    assert_eq!(sample().display_name("orders"), "orders-pid:4242@web-1");

    let no_pid = InstanceProperties {
        host_name: Some("web-1".to_string()),
        ..Default::default()
    };
    assert_eq!(no_pid.display_name("orders"), "orders@web-1");

    let no_host = InstanceProperties {
        process_no: Some("1".to_string()),
        ..Default::default()
    };
    assert_eq!(no_host.display_name("orders"), "orders-pid:1");
    assert_eq!(InstanceProperties::default().display_name("orders"), "orders");

    let named_pid = InstanceProperties::from_json(
        r#"[{"key":"process_no","value":"worker-3"},{"key":"hostname","value":"web-2"}]"#,
    )
    .unwrap();
    assert_eq!(named_pid.display_name("orders"), "orders-pid:worker-3@web-2");
}

#[test]
fn test_detect_describes_this_process() {
    let props = InstanceProperties::detect();

    assert_eq!(props.process_no, Some(std::process::id().to_string()));
    assert_eq!(props.language.as_deref(), Some("rust"));
    assert_eq!(props.os_name.as_deref(), Some(std::env::consts::OS));
    assert!(props.ipv4s.iter().all(|ip| !ip.starts_with("127.")));
}
