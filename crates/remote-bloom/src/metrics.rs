//! Metrics hooks for filter operations
//!
//! Counts and times initialize/insert/query calls made through the service.
//!
//! ## Usage
//!
//! ```
//! use remote_bloom::metrics::{Metrics, MetricsRecorder};
//! use std::time::Duration;
//!
//! let metrics = Metrics::new();
//! metrics.record_filter_created(9586, 7, 1000);
//! metrics.record_lookup(Duration::from_micros(250), true);
//! assert_eq!(metrics.snapshot().lookups_positive, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for filter operations
///
/// Thread-safe counters; every update uses relaxed ordering.
#[derive(Default)]
pub struct Metrics {
    /// Total filters initialized (including overwrites)
    pub filters_created: AtomicU64,
    /// Total keys inserted across all filters
    pub elements_inserted: AtomicU64,
    /// Total queries performed
    pub lookups_performed: AtomicU64,
    /// Total queries answering "possibly present"
    pub lookups_positive: AtomicU64,
    /// Total insert/query calls against a missing filter
    pub not_found: AtomicU64,
    /// Total bytes of bit buffers requested from the store
    pub bytes_allocated: AtomicU64,
    /// Sum of `expected_elements` over all filters initialized
    pub planned_capacity: AtomicU64,
    /// Largest `k` of any filter initialized (store round trips per insert)
    pub max_hash_functions: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record filter creation
    pub fn record_filter_created(&self, size_bits: u64, hash_functions: u32, expected_elements: u64) {
        self.filters_created.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add(size_bits.div_ceil(8), Ordering::Relaxed);
        self.planned_capacity
            .fetch_add(expected_elements, Ordering::Relaxed);
        self.max_hash_functions
            .fetch_max(hash_functions as u64, Ordering::Relaxed);
    }

    /// Record a completed insert
    pub fn record_insert(&self, duration: Duration) {
        self.elements_inserted.fetch_add(1, Ordering::Relaxed);
        self.insert_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record a completed query
    ///
    /// `found` is the answer returned (true positives and false positives alike)
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an operation addressed to an uninitialized filter
    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_created: self.filters_created.load(Ordering::Relaxed),
            elements_inserted: self.elements_inserted.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            planned_capacity: self.planned_capacity.load(Ordering::Relaxed),
            max_hash_functions: self.max_hash_functions.load(Ordering::Relaxed),
            avg_lookup_ns: self.avg_lookup_time_ns(),
            avg_insert_ns: self.avg_insert_time_ns(),
        }
    }

    /// Calculate average lookup time in nanoseconds
    pub fn avg_lookup_time_ns(&self) -> u64 {
        let total = self.lookup_time_ns.load(Ordering::Relaxed);
        let count = self.lookups_performed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Calculate average insert time in nanoseconds
    pub fn avg_insert_time_ns(&self) -> u64 {
        let total = self.insert_time_ns.load(Ordering::Relaxed);
        let count = self.elements_inserted.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.filters_created.store(0, Ordering::Relaxed);
        self.elements_inserted.store(0, Ordering::Relaxed);
        self.lookups_performed.store(0, Ordering::Relaxed);
        self.lookups_positive.store(0, Ordering::Relaxed);
        self.not_found.store(0, Ordering::Relaxed);
        self.bytes_allocated.store(0, Ordering::Relaxed);
        self.planned_capacity.store(0, Ordering::Relaxed);
        self.max_hash_functions.store(0, Ordering::Relaxed);
        self.lookup_time_ns.store(0, Ordering::Relaxed);
        self.insert_time_ns.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub filters_created: u64,
    pub elements_inserted: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub not_found: u64,
    pub bytes_allocated: u64,
    pub planned_capacity: u64,
    pub max_hash_functions: u64,
    pub avg_lookup_ns: u64,
    pub avg_insert_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this to forward to an external metrics system.
pub trait MetricsRecorder: Send + Sync {
    fn record_filter_created(&self, size_bits: u64, hash_functions: u32, expected_elements: u64);

    fn record_insert(&self, duration: Duration);

    fn record_lookup(&self, duration: Duration, found: bool);

    fn record_not_found(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_created(&self, _: u64, _: u32, _: u64) {}
    fn record_insert(&self, _: Duration) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
    fn record_not_found(&self) {}
}

impl MetricsRecorder for Metrics {
    fn record_filter_created(&self, size_bits: u64, hash_functions: u32, expected_elements: u64) {
        Metrics::record_filter_created(self, size_bits, hash_functions, expected_elements);
    }

    fn record_insert(&self, duration: Duration) {
        Metrics::record_insert(self, duration);
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        Metrics::record_lookup(self, duration, found);
    }

    fn record_not_found(&self) {
        Metrics::record_not_found(self);
    }
}
