use std::sync::atomic::AtomicI32;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::info;
use tracing::warn;

use crate::constants::NONE;
use crate::constants::NOT_COOLING_DOWN;
use crate::time::timestamp_millis;

/// Where the agent stands in its registration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    ServiceUnresolved,
    InstanceUnresolved,
    Registered,
}

/// Who this agent is, as far as the backend is concerned.
///
/// Ids only move forward: service id, then instance id. The single way back
/// is [`AgentIdentity::reset_instance`], driven by a backend reset command.
#[derive(Debug)]
pub struct AgentIdentity {
    service_name: String,
    instance_uuid: String,
    service_id: AtomicI32,
    instance_id: AtomicI32,
    instance_registered_time: AtomicI64,
    cool_down_start: AtomicI64,
}

impl AgentIdentity {
    /// An empty `instance_uuid` is replaced by a freshly generated one.
    pub fn new(
        service_name: impl Into<String>,
        instance_uuid: &str,
    ) -> Self {
        let instance_uuid = if instance_uuid.is_empty() {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            instance_uuid.to_string()
        };

        Self {
            service_name: service_name.into(),
            instance_uuid,
            service_id: AtomicI32::new(NONE),
            instance_id: AtomicI32::new(NONE),
            instance_registered_time: AtomicI64::new(0),
            cool_down_start: AtomicI64::new(NOT_COOLING_DOWN),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn instance_uuid(&self) -> &str {
        &self.instance_uuid
    }

    pub fn service_id(&self) -> i32 {
        self.service_id.load(Ordering::Acquire)
    }

    pub fn instance_id(&self) -> i32 {
        self.instance_id.load(Ordering::Acquire)
    }

    pub fn instance_registered_time(&self) -> i64 {
        self.instance_registered_time.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ClientState {
        if self.service_id() == NONE {
            ClientState::ServiceUnresolved
        } else if self.instance_id() == NONE {
            ClientState::InstanceUnresolved
        } else {
            ClientState::Registered
        }
    }

    pub(crate) fn set_service_id(
        &self,
        service_id: i32,
    ) {
        self.service_id.store(service_id, Ordering::Release);
    }

    pub(crate) fn set_instance(
        &self,
        instance_id: i32,
        registered_time: i64,
    ) {
        self.instance_registered_time.store(registered_time, Ordering::Release);
        self.instance_id.store(instance_id, Ordering::Release);
    }

    /// Forgets the instance id so the next tick registers the instance again.
    /// The service id is kept.
    pub fn reset_instance(&self) {
        let previous = self.instance_id.swap(NONE, Ordering::AcqRel);
        if previous != NONE {
            warn!("instance id {} of {} reset", previous, self.service_name);
        }
    }

    // -
    // Cooldown

    pub fn cool_down(&self) {
        self.cool_down_at(timestamp_millis());
    }

    pub(crate) fn cool_down_at(
        &self,
        now: i64,
    ) {
        info!("{} cools down register traffic", self.service_name);
        self.cool_down_start.store(now, Ordering::Release);
    }

    pub fn cool_down_start(&self) -> i64 {
        self.cool_down_start.load(Ordering::Acquire)
    }

    /// Whether traffic is still suppressed at `now`. An elapsed cooldown is
    /// cleared on the way.
    pub(crate) fn is_cooling_down(
        &self,
        now: i64,
        threshold: Duration,
    ) -> bool {
        let start = self.cool_down_start();
        if start <= 0 {
            return false;
        }
        if now - start < threshold.as_millis() as i64 {
            return true;
        }
        self.cool_down_start.store(NOT_COOLING_DOWN, Ordering::Release);
        false
    }
}
