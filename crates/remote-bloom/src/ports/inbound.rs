//! Inbound Ports (Driving Ports)
//!
//! The API callers use to create and use named filters.

use std::fmt::Display;

use async_trait::async_trait;

use crate::domain::FilterMetadata;
use crate::error::FilterError;

/// Primary Bloom filter API (Driving Port)
#[async_trait]
pub trait BloomFilterApi: Send + Sync {
    /// Create (or, per policy, recreate) a named filter
    ///
    /// Sizes the filter for `expected_elements` at `false_positive_rate`
    /// (the configured default when `None`), writes a zeroed bit buffer and
    /// the metadata mapping.
    async fn initialize(
        &self,
        name: &str,
        expected_elements: u64,
        false_positive_rate: Option<f64>,
    ) -> Result<FilterMetadata, FilterError>;

    /// Add a key to the filter
    ///
    /// Idempotent. Fails with `NotFound` if the filter was never initialized.
    async fn insert<K>(&self, name: &str, key: &K) -> Result<(), FilterError>
    where
        K: Display + ?Sized + Sync;

    /// Test whether a key may have been inserted
    ///
    /// Returns:
    /// - `Ok(true)` if the key might be in the set (could be false positive)
    /// - `Ok(false)` if the key is definitely NOT in the set
    /// - `Err(NotFound)` if the filter does not exist
    async fn query<K>(&self, name: &str, key: &K) -> Result<bool, FilterError>
    where
        K: Display + ?Sized + Sync;

    /// Stored parameters of a filter
    async fn metadata(&self, name: &str) -> Result<FilterMetadata, FilterError>;

    /// Whether a filter has been initialized under `name`
    async fn exists(&self, name: &str) -> Result<bool, FilterError>;
}
