use std::hash::Hash;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory get-or-create registry.
///
/// Ids are allocated from 1 upwards; 0 is never handed out. Two callers racing
/// on the same new key both get the id of whichever won.
#[derive(Debug)]
pub struct Inventory<K, V>
where
    K: Eq + Hash,
{
    ids: DashMap<K, i32>,
    records: DashMap<i32, V>,
    sequence: AtomicI32,
}

impl<K, V> Default for Inventory<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Inventory<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            ids: DashMap::new(),
            records: DashMap::new(),
            sequence: AtomicI32::new(1),
        }
    }

    /// Returns the id of `key` and whether this call created it. `init`
    /// builds the record of a new id and is not called otherwise.
    pub fn get_or_create<F>(
        &self,
        key: K,
        init: F,
    ) -> (i32, bool)
    where
        F: FnOnce(i32) -> V,
    {
        if let Some(id) = self.ids.get(&key) {
            return (*id, false);
        }

        match self.ids.entry(key) {
            Entry::Occupied(e) => (*e.get(), false),
            Entry::Vacant(e) => {
                let id = self.sequence.fetch_add(1, Ordering::SeqCst);
                // Record goes in while the key shard is still locked
                self.records.insert(id, init(id));
                e.insert(id);
                (id, true)
            }
        }
    }

    /// Applies `f` to the record of `id`; `None` when the id is unknown.
    pub fn update<F, R>(
        &self,
        id: i32,
        f: F,
    ) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        self.records.get_mut(&id).map(|mut record| f(record.value_mut()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Forgets every key. Ids keep counting up, a dropped id is never reused.
    pub fn clear(&self) {
        self.ids.clear();
        self.records.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<K, V> Inventory<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn get(
        &self,
        id: i32,
    ) -> Option<V> {
        self.records.get(&id).map(|r| r.value().clone())
    }
}
