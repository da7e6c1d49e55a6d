//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the `FilterStore` port.
//!
//! ## Adapters
//!
//! - `InMemoryFilterStore` - process-local store, always available
//! - `RedisFilterStore` - Redis / ElastiCache backend (feature `redis`)

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;

pub use memory::InMemoryFilterStore;
#[cfg(feature = "redis")]
pub use redis_store::{RedisFilterStore, RedisStoreConfig};
