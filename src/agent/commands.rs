//! Out-of-band commands the backend piggybacks on heartbeat responses.

use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::AgentIdentity;
use crate::Dictionaries;
use crate::Result;
use crate::RESET_COMMANDS_METRIC;

/// How many serial numbers are remembered for de-duplication
const SERIAL_NUMBER_CACHE_SIZE: usize = 64;

/// Tells an agent that the backend no longer knows its instance
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResetCommand {
    pub serial_number: String,
    pub instance_id: i32,
    pub heartbeat_time: i64,
    pub instance_uuid: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Reset(ResetCommand),
    /// Any command this agent does not understand
    #[serde(other)]
    Unknown,
}

impl Command {
    pub fn serial_number(&self) -> Option<&str> {
        match self {
            Command::Reset(c) => Some(&c.serial_number),
            Command::Unknown => None,
        }
    }
}

/// A command batch, serialized as JSON inside `instance_command`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Commands {
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Commands {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(command: Command) -> Self {
        Self {
            commands: vec![command],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// An empty payload is an empty batch
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::empty());
        }
        Ok(serde_json::from_str(json)?)
    }
}

/// Receives the command batch of every heartbeat
#[cfg_attr(test, automock)]
pub trait CommandHandler: Send + Sync + 'static {
    fn receive(
        &self,
        commands: Commands,
    );
}

/// Default command handler of an agent.
///
/// Each command is executed at most once, recognised by its serial number.
pub struct CommandService {
    identity: Arc<AgentIdentity>,
    dictionaries: Arc<Dictionaries>,
    seen: Mutex<SerialNumberCache>,
}

impl CommandService {
    pub fn new(
        identity: Arc<AgentIdentity>,
        dictionaries: Arc<Dictionaries>,
    ) -> Self {
        Self {
            identity,
            dictionaries,
            seen: Mutex::new(SerialNumberCache::new(SERIAL_NUMBER_CACHE_SIZE)),
        }
    }

    fn execute(
        &self,
        command: &Command,
    ) {
        match command {
            Command::Reset(reset) => self.execute_reset(reset),
            Command::Unknown => warn!("ignoring unknown command"),
        }
    }

    fn execute_reset(
        &self,
        reset: &ResetCommand,
    ) {
        warn!(
            "backend reset instance {} ({}), re-registering after cooldown",
            reset.instance_id, reset.instance_uuid
        );
        RESET_COMMANDS_METRIC.with_label_values(&["agent"]).inc();

        self.identity.cool_down();
        self.identity.reset_instance();
        self.dictionaries.network_addresses().clear();
    }
}

impl CommandHandler for CommandService {
    fn receive(
        &self,
        commands: Commands,
    ) {
        for command in commands.commands {
            if let Some(serial) = command.serial_number() {
                if !self.seen.lock().insert(serial) {
                    debug!("command {} already executed", serial);
                    continue;
                }
            }
            self.execute(&command);
        }
    }
}

/// Bounded FIFO set of recently seen serial numbers
#[derive(Debug)]
pub(crate) struct SerialNumberCache {
    order: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
}

impl SerialNumberCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns false when the serial number was already present
    pub(crate) fn insert(
        &mut self,
        serial: &str,
    ) -> bool {
        if self.members.contains(serial) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.order.push_back(serial.to_string());
        self.members.insert(serial.to_string());
        true
    }
}
