use super::*;

fn create_test_registry() -> Registry {
    let registry = Registry::new_custom(Some("apm".to_string()), None).unwrap();
    register_custom_metrics(&registry);
    registry
}

#[test]
fn test_custom_registry() {
    let registry = create_test_registry();

    REGISTRATIONS_METRIC.with_label_values(&["service", "created"]).inc();
    RESET_COMMANDS_METRIC.with_label_values(&["backend"]).inc();
    let metrics = &registry.gather();
    assert!(!metrics.is_empty());

    let metric_names: Vec<_> = metrics.iter().map(|m| m.get_name()).collect();
    assert!(
        metric_names.contains(&"apm_registrations"),
        "Missing apm_registrations"
    );
    assert!(
        metric_names.contains(&"apm_reset_commands"),
        "Missing apm_reset_commands"
    );
}

#[test]
fn test_counter_increment() {
    REGISTER_TICK_METRIC.with_label_values(&["metrics_test"]).reset();

    REGISTER_TICK_METRIC.with_label_values(&["metrics_test"]).inc();
    REGISTER_TICK_METRIC.with_label_values(&["metrics_test"]).inc();

    let value = REGISTER_TICK_METRIC.with_label_values(&["metrics_test"]).get();
    assert_eq!(value, 2, "Counter should increment correctly");
}

#[test]
fn test_gauge_labels_are_independent() {
    DICTIONARY_PENDING_METRIC.with_label_values(&["metrics_test_a"]).set(3);
    DICTIONARY_PENDING_METRIC.with_label_values(&["metrics_test_b"]).set(7);

    assert_eq!(DICTIONARY_PENDING_METRIC.with_label_values(&["metrics_test_a"]).get(), 3);
    assert_eq!(DICTIONARY_PENDING_METRIC.with_label_values(&["metrics_test_b"]).get(), 7);
}

#[test]
fn test_encode_contains_registered_metric() {
    let registry = create_test_registry();
    DICTIONARY_SYNC_RESOLVED_METRIC
        .with_label_values(&["metrics_test"])
        .inc_by(4);

    let text = encode(&registry.gather());
    assert!(text.contains("apm_dictionary_sync_resolved"));
}
