//! # Redis Filter Store
//!
//! Backs filters with a Redis (or ElastiCache) server:
//!
//! - metadata channel: a hash, written with `DEL` + `HSET` in one
//!   `MULTI`/`EXEC` transaction and read with `HGETALL`
//! - bit channel: a string, created with `SET` and addressed with
//!   `SETBIT` / `GETBIT` (MSB-first, as the port requires)
//!
//! Connection handling is delegated to `redis::aio::ConnectionManager`,
//! which reconnects on its own; commands are never retried here.

use std::collections::HashMap;
use std::env;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::error::StoreError;
use crate::ports::FilterStore;

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Connection URL, e.g. `redis://host:6379/0` or `rediss://...`
    pub url: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

impl RedisStoreConfig {
    /// Read `BLOOM_REDIS_URL`, falling back to the local default
    pub fn from_env() -> Self {
        Self {
            url: env::var("BLOOM_REDIS_URL").unwrap_or_else(|_| Self::default().url),
        }
    }
}

/// Redis-backed implementation of [`FilterStore`]
#[derive(Clone)]
pub struct RedisFilterStore {
    conn: ConnectionManager,
}

impl RedisFilterStore {
    /// Connect to the server named in `config`
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StoreError::Connection(format!("invalid Redis URL: {}", e)))?;
        let conn = ConnectionManager::new(client).await?;
        debug!(url = %config.url, "Connected to Redis filter store");
        Ok(Self { conn })
    }

    /// Wrap an existing connection manager
    pub fn from_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl FilterStore for RedisFilterStore {
    async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic().cmd("DEL").arg(key).ignore();
        if !fields.is_empty() {
            let hset = pipe.cmd("HSET").arg(key);
            for (field, value) in fields {
                hset.arg(field).arg(value);
            }
            hset.ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn read_fields(&self, key: &str) -> Result<Option<HashMap<String, String>>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            redis::cmd("HGETALL").arg(key).query_async(&mut conn).await?;
        // HGETALL answers an empty map for a missing key
        Ok(if fields.is_empty() { None } else { Some(fields) })
    }

    async fn write_zeroed(&self, key: &str, len: usize) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let zeros = vec![0u8; len];
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(zeros)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn set_bit(&self, key: &str, offset: u64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _previous: u8 = redis::cmd("SETBIT")
            .arg(key)
            .arg(offset)
            .arg(1)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_bit(&self, key: &str, offset: u64) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let bit: u8 = redis::cmd("GETBIT")
            .arg(key)
            .arg(offset)
            .query_async(&mut conn)
            .await?;
        Ok(bit == 1)
    }

    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let bytes: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(bytes)
    }
}
