//! Backend side of the registration protocol.
mod inventory;
mod registration_service;
pub use inventory::*;
pub use registration_service::*;

#[cfg(test)]
mod inventory_test;
#[cfg(test)]
mod registration_service_test;
