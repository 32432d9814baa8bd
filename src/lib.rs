//! Identifier registration and dictionary synchronization between tracing
//! agents and their backend.
//!
//! Agents translate service, instance, endpoint and network address names into
//! compact integer ids. The ids are handed out by the backend
//! ([`RegistrationService`]) and mirrored on the agent in [`Dictionaries`],
//! which a periodic [`RegisterClient`] keeps filled.
mod agent;
mod config;
pub mod constants;
mod dictionary;
mod errors;
mod metrics;
mod network;
pub mod proto;
mod server;
pub mod utils;

pub use agent::*;
pub use config::*;
pub use dictionary::*;
pub use errors::*;
pub use metrics::*;
pub use network::grpc::*;
pub use network::*;
pub use server::*;
pub use utils::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;

//-----------------------------------------------------------
// Autometrics
/// autometrics: https://docs.autometrics.dev/rust/adding-alerts-and-slos
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;
const API_SLO: Objective = Objective::new("api")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms10, ObjectivePercentile::P99);
