//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Parameter sizing (m, k)
//! - Seeded hash functions and bit indexing
//! - Filter metadata and its field encoding
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod hash_functions;
pub mod metadata;
pub mod parameters;

pub use config::{ExistingFilterPolicy, FilterConfig, FilterConfigBuilder};
pub use hash_functions::{bit_index, bit_positions, canonical_key};
pub use metadata::{bits_key, metadata_key, FilterMetadata};
pub use parameters::{compute_parameters, validate_sizing_inputs, BloomFilterParams};
