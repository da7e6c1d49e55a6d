//! In-memory filter store
//!
//! Keeps mappings and bit buffers in process memory behind a
//! `tokio::sync::RwLock`. Used by tests and for single-process deployments
//! where nothing has to survive a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use bitvec::prelude::*;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::ports::FilterStore;

/// In-memory implementation of [`FilterStore`]
///
/// Bit access is stricter than Redis: setting or reading a bit on a missing
/// buffer is `MissingBuffer`, and offsets past the end are
/// `OffsetOutOfRange` instead of growing the buffer.
#[derive(Default)]
pub struct InMemoryFilterStore {
    fields: RwLock<HashMap<String, HashMap<String, String>>>,
    buffers: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of set bits in the buffer under `key`
    pub async fn count_ones(&self, key: &str) -> Option<usize> {
        let buffers = self.buffers.read().await;
        buffers
            .get(key)
            .map(|bytes| bytes.view_bits::<Msb0>().count_ones())
    }
}

#[async_trait]
impl FilterStore for InMemoryFilterStore {
    async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mapping = fields.iter().cloned().collect();
        self.fields.write().await.insert(key.to_string(), mapping);
        Ok(())
    }

    async fn read_fields(&self, key: &str) -> Result<Option<HashMap<String, String>>, StoreError> {
        Ok(self.fields.read().await.get(key).cloned())
    }

    async fn write_zeroed(&self, key: &str, len: usize) -> Result<(), StoreError> {
        self.buffers
            .write()
            .await
            .insert(key.to_string(), vec![0u8; len]);
        Ok(())
    }

    async fn set_bit(&self, key: &str, offset: u64) -> Result<(), StoreError> {
        let mut buffers = self.buffers.write().await;
        let bytes = buffers
            .get_mut(key)
            .ok_or_else(|| StoreError::MissingBuffer(key.to_string()))?;
        let bits = bytes.view_bits_mut::<Msb0>();

        if offset >= bits.len() as u64 {
            return Err(StoreError::OffsetOutOfRange {
                key: key.to_string(),
                offset,
            });
        }
        bits.set(offset as usize, true);
        Ok(())
    }

    async fn get_bit(&self, key: &str, offset: u64) -> Result<bool, StoreError> {
        let buffers = self.buffers.read().await;
        let bytes = buffers
            .get(key)
            .ok_or_else(|| StoreError::MissingBuffer(key.to_string()))?;

        bytes
            .view_bits::<Msb0>()
            .get(offset as usize)
            .map(|bit| *bit)
            .ok_or_else(|| StoreError::OffsetOutOfRange {
                key: key.to_string(),
                offset,
            })
    }

    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.buffers.read().await.get(key).cloned())
    }
}
