//! Service Layer
//!
//! Orchestrates domain logic against the backing store.

pub mod bloom_filter_service;

pub use bloom_filter_service::BloomFilterService;
