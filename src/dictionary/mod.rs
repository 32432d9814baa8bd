//! Agent-side name to id dictionaries.
//!
//! One [`Dictionary`] per key kind mirrors a backend inventory. The tracing hot
//! path reads them without ever touching the network; the register task fills
//! them through [`Dictionary::sync`].
mod cache;
mod keys;
pub use cache::*;
pub use keys::*;
