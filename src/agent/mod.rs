//! Agent side of the registration protocol: identity, the periodic register
//! client and the commands it receives from the backend.
mod builder;
mod commands;
mod identity;
mod properties;
mod register_client;
pub use builder::*;
pub use commands::*;
pub use identity::*;
pub use properties::*;
pub use register_client::*;

#[cfg(test)]
mod commands_test;
#[cfg(test)]
mod properties_test;
