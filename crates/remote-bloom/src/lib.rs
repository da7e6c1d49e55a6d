//! # Remote Bloom
//!
//! Bloom filters whose bits live in an external key/value store (Redis,
//! ElastiCache, or an in-memory stand-in) instead of process memory.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `compute_parameters`: sizes `m` bits and `k` hash functions from `n`, `p`
//!   - `bit_index`: seeded MurmurHash3 bit offset for one key
//!   - `FilterMetadata`: stored parameters and their field encoding
//!   - `FilterConfig`: defaults and re-initialization policy
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `BloomFilterApi`: Driving port (initialize / insert / query)
//!   - `FilterStore`: Driven port (metadata mapping + bit buffer)
//!
//! - **Service Layer** (`service/`): `BloomFilterService` implements
//!   `BloomFilterApi` over any `FilterStore`
//!
//! - **Adapters Layer** (`adapters/`): `InMemoryFilterStore`, and
//!   `RedisFilterStore` behind the `redis` feature
//!
//! ## Invariants
//!
//! - No false negatives: once `insert` completes, `query` returns `true`
//! - `m >= 100` and `k >= 1` for every filter; both fixed after creation
//! - Bits only ever go from 0 to 1; there is no delete
//!
//! ## Usage Example
//!
//! ```
//! use remote_bloom::{BloomFilterApi, BloomFilterService, InMemoryFilterStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), remote_bloom::FilterError> {
//! let service = BloomFilterService::new(Arc::new(InMemoryFilterStore::new()));
//!
//! let info = service.initialize("user_ids", 100_000, Some(0.01)).await?;
//! println!("{} bits, {} hash functions", info.size, info.hash_functions);
//!
//! service.insert("user_ids", "user123").await?;
//! assert!(service.query("user_ids", "user123").await?);
//! assert!(!service.query("user_ids", "user999").await?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::InMemoryFilterStore;
#[cfg(feature = "redis")]
pub use adapters::{RedisFilterStore, RedisStoreConfig};
pub use domain::{ExistingFilterPolicy, FilterConfig, FilterConfigBuilder, FilterMetadata};
pub use error::{FilterError, StoreError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{BloomFilterApi, FilterStore};
pub use service::BloomFilterService;
