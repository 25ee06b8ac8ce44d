//! Session-state persistence over a key-value backend with native expiry.
//!
//! The crate binds a small session-store contract ([`SessionStore`]: find,
//! commit, delete, enumerate) to Redis, which provides the storage engine
//! and per-key expiry. Records are opaque byte payloads keyed by a
//! caller-supplied token; the surrounding session framework owns encoding,
//! token issuance, and lifecycle policy.

pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use store::SessionStore;
