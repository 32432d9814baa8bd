use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

pub(crate) fn get_duration_since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

/// Wall clock in milliseconds, the unit of every timestamp on the wire
pub fn timestamp_millis() -> i64 {
    get_duration_since_epoch().as_millis() as i64
}
