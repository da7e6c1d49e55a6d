//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for callers
//! - Driven Ports (outbound) - the backing key/value store

pub mod inbound;
pub mod outbound;

pub use inbound::BloomFilterApi;
pub use outbound::FilterStore;
