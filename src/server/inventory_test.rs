use std::collections::HashSet;
use std::sync::Arc;

use super::*;

#[test]
fn test_ids_start_at_one_and_are_stable() {
    let inventory: Inventory<String, String> = Inventory::new();

    let (a, created_a) = inventory.get_or_create("a".to_string(), |id| format!("record-{id}"));
    let (b, created_b) = inventory.get_or_create("b".to_string(), |id| format!("record-{id}"));
    let (a2, created_a2) = inventory.get_or_create("a".to_string(), |_| unreachable!());

    assert_eq!((a, created_a), (1, true));
    assert_eq!((b, created_b), (2, true));
    assert_eq!((a2, created_a2), (1, false));
    assert_eq!(inventory.get(1), Some("record-1".to_string()));
    assert_eq!(inventory.len(), 2);
}

#[test]
fn test_concurrent_get_or_create_converges() {
    let inventory: Arc<Inventory<String, ()>> = Arc::new(Inventory::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let inv = inventory.clone();
            std::thread::spawn(move || {
                (0..50)
                    .map(|i| inv.get_or_create(format!("name-{i}"), |_| ()).0)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<i32>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for r in &results[1..] {
        assert_eq!(r, &results[0]);
    }
    let distinct: HashSet<i32> = results[0].iter().copied().collect();
    assert_eq!(distinct.len(), 50);
    assert_eq!(inventory.len(), 50);
}

#[test]
fn test_update_and_clear() {
    let inventory: Inventory<&'static str, i64> = Inventory::new();
    let (id, _) = inventory.get_or_create("x", |_| 0);

    assert_eq!(inventory.update(id, |v| {
        *v = 5;
        *v
    }), Some(5));
    assert_eq!(inventory.update(99, |v| *v), None);
    assert_eq!(inventory.get(id), Some(5));

    inventory.clear();
    assert!(inventory.is_empty());
    assert_eq!(inventory.get(id), None);

    // ids are not reused after clear
    let (id2, created) = inventory.get_or_create("x", |_| 0);
    assert!(created);
    assert!(id2 > id);
}
