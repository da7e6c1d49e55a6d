//! Bloom Filter Service
//!
//! Orchestrates the pure sizing/indexing functions against the injected
//! store. Holds no filter state of its own: every insert and query is a
//! sequence of round trips to the store.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::{
    bit_positions, bits_key, canonical_key, compute_parameters, validate_sizing_inputs,
    ExistingFilterPolicy, FilterConfig, FilterMetadata,
};
use crate::error::FilterError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{BloomFilterApi, FilterStore};

/// Bloom Filter Service implementation
///
/// Implements the `BloomFilterApi` port over any [`FilterStore`].
pub struct BloomFilterService<S: FilterStore> {
    /// Backing store (driven port)
    store: Arc<S>,
    /// Defaults and re-initialization policy
    config: FilterConfig,
    /// Operation metrics
    metrics: Arc<dyn MetricsRecorder>,
}

impl<S: FilterStore> BloomFilterService<S> {
    /// Create a new service over `store` with the default configuration
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: FilterConfig::default(),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Create with a custom configuration
    pub fn with_config(store: Arc<S>, config: FilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Replace the metrics recorder
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Insert every key from `keys`, loading metadata once
    ///
    /// Returns the number of keys inserted. Stops at the first store error;
    /// keys before it stay inserted.
    pub async fn insert_all<I, K>(&self, name: &str, keys: I) -> Result<u64, FilterError>
    where
        I: IntoIterator<Item = K>,
        I::IntoIter: Send,
        K: Display + Send,
    {
        let metadata = self.require_metadata(name).await?;
        let bits = bits_key(name);
        let mut inserted = 0u64;

        for key in keys {
            let start = Instant::now();
            let key = canonical_key(&key);
            self.set_key_bits(&bits, &key, &metadata).await?;
            self.metrics.record_insert(start.elapsed());
            inserted += 1;
        }

        debug!(filter = %name, inserted, "Inserted batch into bloom filter");
        Ok(inserted)
    }

    /// Load metadata or fail with `NotFound`
    async fn require_metadata(&self, name: &str) -> Result<FilterMetadata, FilterError> {
        match self.store.load_metadata(name).await? {
            Some(metadata) => Ok(metadata),
            None => {
                self.metrics.record_not_found();
                warn!(filter = %name, "Bloom filter not found");
                Err(FilterError::NotFound(name.to_string()))
            }
        }
    }

    async fn set_key_bits(
        &self,
        bits: &str,
        key: &str,
        metadata: &FilterMetadata,
    ) -> Result<(), FilterError> {
        // No rollback: a failure part way leaves a subset of the bits set
        for offset in bit_positions(key, metadata.hash_functions, metadata.size) {
            self.store.set_bit(bits, offset).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<S: FilterStore + 'static> BloomFilterApi for BloomFilterService<S> {
    async fn initialize(
        &self,
        name: &str,
        expected_elements: u64,
        false_positive_rate: Option<f64>,
    ) -> Result<FilterMetadata, FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidParameters(
                "filter name cannot be empty".to_string(),
            ));
        }

        let fpr = false_positive_rate.unwrap_or(self.config.default_false_positive_rate);
        validate_sizing_inputs(expected_elements, fpr)?;

        if expected_elements > self.config.max_expected_elements {
            return Err(FilterError::InvalidParameters(format!(
                "expected_elements {} exceeds configured maximum {}",
                expected_elements, self.config.max_expected_elements
            )));
        }

        let params = compute_parameters(expected_elements, fpr);
        if params.size_bits > self.config.max_size_bits {
            return Err(FilterError::InvalidParameters(format!(
                "filter needs {} bits, above configured maximum {}",
                params.size_bits, self.config.max_size_bits
            )));
        }

        if self.store.has_metadata(name).await? {
            match self.config.existing_filter_policy {
                ExistingFilterPolicy::FailIfExists => {
                    return Err(FilterError::AlreadyExists(name.to_string()));
                }
                ExistingFilterPolicy::Overwrite => {
                    warn!(filter = %name, "Overwriting existing bloom filter");
                    // Readers see "not found" rather than old metadata over new bits
                    self.store.clear_metadata(name).await?;
                }
            }
        }

        let metadata = FilterMetadata::new(name, params, expected_elements, fpr);

        // Bits before metadata: metadata present implies the buffer exists
        self.store.reset_bits(&metadata).await?;
        self.store.save_metadata(&metadata).await?;

        self.metrics.record_filter_created(
            metadata.size,
            metadata.hash_functions,
            metadata.expected_elements,
        );
        info!(
            filter = %name,
            size_bits = metadata.size,
            hash_functions = metadata.hash_functions,
            expected_elements,
            false_positive_rate = fpr,
            "Initialized bloom filter"
        );

        Ok(metadata)
    }

    async fn insert<K>(&self, name: &str, key: &K) -> Result<(), FilterError>
    where
        K: Display + ?Sized + Sync,
    {
        let start = Instant::now();
        let metadata = self.require_metadata(name).await?;
        let key = canonical_key(key);

        self.set_key_bits(&bits_key(name), &key, &metadata).await?;

        self.metrics.record_insert(start.elapsed());
        debug!(filter = %name, key = %key, "Inserted key into bloom filter");
        Ok(())
    }

    async fn query<K>(&self, name: &str, key: &K) -> Result<bool, FilterError>
    where
        K: Display + ?Sized + Sync,
    {
        let start = Instant::now();
        let metadata = self.require_metadata(name).await?;
        let key = canonical_key(key);
        let bits = bits_key(name);

        let mut found = true;
        for offset in bit_positions(&key, metadata.hash_functions, metadata.size) {
            if !self.store.get_bit(&bits, offset).await? {
                found = false;
                break;
            }
        }

        self.metrics.record_lookup(start.elapsed(), found);
        debug!(filter = %name, key = %key, found, "Queried bloom filter");
        Ok(found)
    }

    async fn metadata(&self, name: &str) -> Result<FilterMetadata, FilterError> {
        self.require_metadata(name).await
    }

    async fn exists(&self, name: &str) -> Result<bool, FilterError> {
        Ok(self.store.has_metadata(name).await?)
    }
}
