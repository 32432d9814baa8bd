use std::collections::HashSet;

use dashmap::DashMap;
use dashmap::DashSet;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::DictionaryKey;
use super::EndpointKey;
use super::InstanceKey;
use super::NetworkAddressKey;
use super::ServiceKey;
use crate::constants::NONE;
use crate::DictionaryConfig;
use crate::RegisterTransport;
use crate::Result;
use crate::DICTIONARY_PENDING_METRIC;
use crate::DICTIONARY_SYNC_RESOLVED_METRIC;

/// Outcome of a dictionary lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PossibleFound {
    Found(i32),
    NotFound,
}

impl PossibleFound {
    pub fn is_found(&self) -> bool {
        matches!(self, PossibleFound::Found(_))
    }

    /// The resolved id, or [`NONE`] when not found
    pub fn id_or_none(&self) -> i32 {
        match self {
            PossibleFound::Found(id) => *id,
            PossibleFound::NotFound => NONE,
        }
    }
}

/// Agent-side mirror of one backend inventory.
///
/// Lookups are served from memory only. Unknown keys are parked in a pending
/// set that `sync` drains in one batch. Resolved plus pending entries are
/// bounded by `buffer_size`; the bound is checked without a lock, so heavy
/// concurrent registration may overshoot it slightly.
#[derive(Debug)]
pub struct Dictionary<K: DictionaryKey> {
    entries: DashMap<K, i32>,
    pending: DashSet<K>,
    buffer_size: usize,
}

impl<K: DictionaryKey> Dictionary<K> {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            entries: DashMap::new(),
            pending: DashSet::new(),
            buffer_size,
        }
    }

    /// Pure read, never queues the key.
    pub fn find(
        &self,
        key: &K,
    ) -> PossibleFound {
        match self.entries.get(key) {
            Some(id) => PossibleFound::Found(*id),
            None => PossibleFound::NotFound,
        }
    }

    /// Reads the key and, on a miss, queues it for the next `sync` if the
    /// dictionary has room. Queuing the same key twice is a no-op.
    pub fn find_or_register(
        &self,
        key: K,
    ) -> PossibleFound {
        if let Some(id) = self.entries.get(&key) {
            return PossibleFound::Found(*id);
        }

        if key.is_registrable() && self.entries.len() + self.pending.len() < self.buffer_size {
            self.pending.insert(key);
        }
        PossibleFound::NotFound
    }

    /// Resolves every pending key through `transport`.
    ///
    /// Returns how many keys were learned by this call. Keys the backend did
    /// not answer stay pending for the next call.
    pub async fn sync<T>(
        &self,
        transport: &T,
    ) -> Result<usize>
    where
        T: RegisterTransport + ?Sized,
    {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let keys: Vec<K> = self.pending.iter().map(|k| k.key().clone()).collect();
        debug!("syncing {} pending {} keys", keys.len(), K::OPERATION);
        let requested: HashSet<K> = keys.iter().cloned().collect();

        let resolved = K::register(transport, keys).await?;

        let mut learned = 0;
        for (key, id) in resolved {
            if id == NONE {
                continue;
            }
            if !requested.contains(&key) {
                warn!("ignoring unrequested {} key {:?}", K::OPERATION, key);
                continue;
            }
            // A key is always in at least one of the two collections
            if self.entries.insert(key.clone(), id).is_none() {
                learned += 1;
            }
            self.pending.remove(&key);
        }

        if learned > 0 {
            info!("resolved {} {} keys", learned, K::OPERATION);
        }
        DICTIONARY_SYNC_RESOLVED_METRIC
            .with_label_values(&[K::OPERATION])
            .inc_by(learned as u64);
        DICTIONARY_PENDING_METRIC
            .with_label_values(&[K::OPERATION])
            .set(self.pending.len() as i64);

        Ok(learned)
    }

    /// Number of resolved entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(
        &self,
        key: &K,
    ) -> bool {
        self.pending.contains(key)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Dictionary<NetworkAddressKey> {
    /// Drops every resolved address. Pending addresses are kept.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Dictionary<EndpointKey> {
    pub fn find_or_prepare_for_register(
        &self,
        service_id: i32,
        endpoint_name: &str,
        is_entry: bool,
        is_exit: bool,
    ) -> PossibleFound {
        self.find_or_register(EndpointKey::new(service_id, endpoint_name, is_entry, is_exit))
    }

    /// Looks up an endpoint whose direction is unknown, never queues it.
    pub fn find_only(
        &self,
        service_id: i32,
        endpoint_name: &str,
    ) -> PossibleFound {
        self.find(&EndpointKey::new(service_id, endpoint_name, false, false))
    }
}

/// The four dictionaries of one agent process.
///
/// Built once at boot and handed to whoever needs name to id translation.
#[derive(Debug)]
pub struct Dictionaries {
    services: Dictionary<ServiceKey>,
    instances: Dictionary<InstanceKey>,
    network_addresses: Dictionary<NetworkAddressKey>,
    endpoints: Dictionary<EndpointKey>,
}

impl Dictionaries {
    pub fn new(config: &DictionaryConfig) -> Self {
        Self {
            services: Dictionary::new(config.service_code_buffer_size),
            instances: Dictionary::new(config.service_code_buffer_size),
            network_addresses: Dictionary::new(config.service_code_buffer_size),
            endpoints: Dictionary::new(config.endpoint_name_buffer_size),
        }
    }

    pub fn services(&self) -> &Dictionary<ServiceKey> {
        &self.services
    }

    pub fn instances(&self) -> &Dictionary<InstanceKey> {
        &self.instances
    }

    pub fn network_addresses(&self) -> &Dictionary<NetworkAddressKey> {
        &self.network_addresses
    }

    pub fn endpoints(&self) -> &Dictionary<EndpointKey> {
        &self.endpoints
    }
}
