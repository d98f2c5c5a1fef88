//! Session store adapters - implementations of the SessionStore port.
//!
//! - `InMemorySessionStore` - process-local map
//! - `FileSessionStore` - one JSON file per session
//! - `RedisSessionStore` - shared store with optional TTL

mod file;
mod in_memory;
mod redis;

pub use self::redis::{RedisSessionStore, DEFAULT_REDIS_PREFIX};
pub use file::FileSessionStore;
pub use in_memory::InMemorySessionStore;
