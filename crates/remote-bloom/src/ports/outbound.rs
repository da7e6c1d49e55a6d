//! Outbound Ports (Driven Ports)
//!
//! The capability set the filter service needs from a backing key/value
//! store: a metadata channel (whole-mapping get/set) and a bit channel
//! (flat byte buffer with single-bit get/set).
//!
//! Production: `RedisFilterStore` (feature `redis`)
//! Testing: `InMemoryFilterStore`

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::metadata::{bits_key, metadata_key, FilterMetadata};
use crate::error::{FilterError, StoreError};

/// Backing store for filter metadata and bits (Driven Port)
///
/// Implementations own all durable state. They must make `set_bit`
/// idempotent and immediately visible to `get_bit` from any caller; the
/// service adds no locking or caching of its own.
///
/// Bits are numbered MSB-first: offset 0 is the high bit of byte 0.
#[async_trait]
pub trait FilterStore: Send + Sync {
    /// Atomically replace the field→value mapping stored under `key`
    async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError>;

    /// Atomically read the mapping under `key`; `None` if absent
    async fn read_fields(&self, key: &str) -> Result<Option<HashMap<String, String>>, StoreError>;

    /// Store `len` zero bytes under `key`, replacing any previous buffer
    async fn write_zeroed(&self, key: &str, len: usize) -> Result<(), StoreError>;

    /// Set bit `offset` of the buffer under `key` to 1
    async fn set_bit(&self, key: &str, offset: u64) -> Result<(), StoreError>;

    /// Read bit `offset` of the buffer under `key`
    async fn get_bit(&self, key: &str, offset: u64) -> Result<bool, StoreError>;

    /// Whole bit buffer under `key`; `None` if absent
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Persist filter metadata under `"<name>:metadata"`
    async fn save_metadata(&self, metadata: &FilterMetadata) -> Result<(), StoreError> {
        self.write_fields(&metadata_key(&metadata.name), &metadata.to_fields())
            .await
    }

    /// Load and decode filter metadata; `None` if the filter was never initialized
    async fn load_metadata(&self, name: &str) -> Result<Option<FilterMetadata>, FilterError> {
        match self.read_fields(&metadata_key(name)).await? {
            Some(fields) if !fields.is_empty() => {
                FilterMetadata::from_fields(name, &fields).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Drop the metadata mapping of a filter so it reads as uninitialized
    async fn clear_metadata(&self, name: &str) -> Result<(), StoreError> {
        self.write_fields(&metadata_key(name), &[]).await
    }

    /// Whether a non-empty metadata mapping exists for `name`
    ///
    /// Does not decode the mapping, so corrupt metadata still counts.
    async fn has_metadata(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .read_fields(&metadata_key(name))
            .await?
            .is_some_and(|fields| !fields.is_empty()))
    }

    /// Replace the bit buffer of a filter with `ceil(m/8)` zero bytes
    async fn reset_bits(&self, metadata: &FilterMetadata) -> Result<(), StoreError> {
        self.write_zeroed(&bits_key(&metadata.name), metadata.byte_len())
            .await
    }
}
