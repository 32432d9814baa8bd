// -
// Identifiers

/// Id value meaning "not assigned". Backends allocate ids starting from 1 and
/// never hand this value out for a registered name.
pub const NONE: i32 = 0;

/// Cooldown start value meaning "not cooling down"
pub(crate) const NOT_COOLING_DOWN: i64 = -1;

// -
// Instance property keys understood by the backend

pub const HOST_NAME: &str = "hostname";
pub const OS_NAME: &str = "os_name";
pub const LANGUAGE: &str = "language";
pub const PROCESS_NO: &str = "process_no";
pub const IPV4: &str = "ipv4";

/// Language reported by agents built from this crate
pub(crate) const AGENT_LANGUAGE: &str = "rust";

// -
// Metric labels

pub(crate) const OP_SERVICE: &str = "service";
pub(crate) const OP_INSTANCE: &str = "instance";
pub(crate) const OP_ENDPOINT: &str = "endpoint";
pub(crate) const OP_NETWORK_ADDRESS: &str = "network_address";
