//! # Partial Failure
//!
//! Store failures part way through an operation propagate unchanged. A
//! half-applied insert leaves only a subset of its bits set, and a
//! half-applied initialize leaves the filter reading as not found.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use remote_bloom::domain::{bit_positions, FilterMetadata};
    use remote_bloom::{
        BloomFilterApi, BloomFilterService, FilterError, FilterStore, InMemoryFilterStore,
        StoreError,
    };

    use crate::integration::init_tracing;

    /// Store that fails every `set_bit` after a budget is used up
    struct FlakyStore {
        inner: InMemoryFilterStore,
        set_bit_budget: AtomicUsize,
    }

    impl FlakyStore {
        fn new(budget: usize) -> Self {
            Self {
                inner: InMemoryFilterStore::new(),
                set_bit_budget: AtomicUsize::new(budget),
            }
        }
    }

    #[async_trait]
    impl FilterStore for FlakyStore {
        async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
            self.inner.write_fields(key, fields).await
        }

        async fn read_fields(&self, key: &str) -> Result<Option<HashMap<String, String>>, StoreError> {
            self.inner.read_fields(key).await
        }

        async fn write_zeroed(&self, key: &str, len: usize) -> Result<(), StoreError> {
            self.inner.write_zeroed(key, len).await
        }

        async fn set_bit(&self, key: &str, offset: u64) -> Result<(), StoreError> {
            let remaining = self
                .set_bit_budget
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            if remaining.is_err() {
                return Err(StoreError::Connection("connection reset".to_string()));
            }
            self.inner.set_bit(key, offset).await
        }

        async fn get_bit(&self, key: &str, offset: u64) -> Result<bool, StoreError> {
            self.inner.get_bit(key, offset).await
        }

        async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.read_bytes(key).await
        }
    }

    /// Store whose metadata or buffer writes can be switched to fail
    ///
    /// Clearing a mapping (an empty write) always succeeds, so an overwrite
    /// gets as far as dropping the old metadata.
    #[derive(Default)]
    struct WriteFaultStore {
        inner: InMemoryFilterStore,
        fail_metadata_writes: AtomicBool,
        fail_buffer_writes: AtomicBool,
    }

    #[async_trait]
    impl FilterStore for WriteFaultStore {
        async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
            if !fields.is_empty() && self.fail_metadata_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Command("EXECABORT".to_string()));
            }
            self.inner.write_fields(key, fields).await
        }

        async fn read_fields(&self, key: &str) -> Result<Option<HashMap<String, String>>, StoreError> {
            self.inner.read_fields(key).await
        }

        async fn write_zeroed(&self, key: &str, len: usize) -> Result<(), StoreError> {
            if self.fail_buffer_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Connection("connection reset".to_string()));
            }
            self.inner.write_zeroed(key, len).await
        }

        async fn set_bit(&self, key: &str, offset: u64) -> Result<(), StoreError> {
            self.inner.set_bit(key, offset).await
        }

        async fn get_bit(&self, key: &str, offset: u64) -> Result<bool, StoreError> {
            self.inner.get_bit(key, offset).await
        }

        async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.read_bytes(key).await
        }
    }

    async fn assert_not_found<S: FilterStore + 'static>(service: &BloomFilterService<S>, name: &str) {
        assert!(!service.exists(name).await.unwrap());
        assert!(matches!(
            service.query(name, "a").await,
            Err(FilterError::NotFound(_))
        ));
        assert!(matches!(
            service.insert(name, "a").await,
            Err(FilterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_metadata_write_leaves_new_filter_not_found() {
        init_tracing();
        let store = Arc::new(WriteFaultStore::default());
        let service = BloomFilterService::new(store.clone());

        store.fail_metadata_writes.store(true, Ordering::SeqCst);
        let result = service.initialize("fresh", 1000, None).await;
        assert!(matches!(
            result,
            Err(FilterError::Store(StoreError::Command(_)))
        ));

        // The buffer was written, but without metadata the filter is not ready
        assert!(store.read_bytes("fresh:bits").await.unwrap().is_some());
        assert_not_found(&service, "fresh").await;

        store.fail_metadata_writes.store(false, Ordering::SeqCst);
        service.initialize("fresh", 1000, None).await.unwrap();
        service.insert("fresh", "a").await.unwrap();
        assert!(service.query("fresh", "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_metadata_write_on_overwrite_hides_old_filter() {
        init_tracing();
        let store = Arc::new(WriteFaultStore::default());
        let service = BloomFilterService::new(store.clone());
        service.initialize("f", 1000, None).await.unwrap();
        service.insert("f", "a").await.unwrap();

        store.fail_metadata_writes.store(true, Ordering::SeqCst);
        assert!(service.initialize("f", 5000, None).await.is_err());

        // Old metadata over the fresh zeroed buffer would answer "absent" for "a"
        assert_not_found(&service, "f").await;
    }

    #[tokio::test]
    async fn test_failed_buffer_write_on_overwrite_hides_old_filter() {
        init_tracing();
        let store = Arc::new(WriteFaultStore::default());
        let service = BloomFilterService::new(store.clone());
        service.initialize("f", 1000, None).await.unwrap();
        service.insert("f", "a").await.unwrap();

        store.fail_buffer_writes.store(true, Ordering::SeqCst);
        let result = service.initialize("f", 1000, None).await;
        assert!(matches!(
            result,
            Err(FilterError::Store(StoreError::Connection(_)))
        ));

        assert_not_found(&service, "f").await;
    }

    #[tokio::test]
    async fn test_store_error_propagates_from_insert() {
        init_tracing();
        let store = Arc::new(FlakyStore::new(3));
        let service = BloomFilterService::new(store.clone());
        let metadata: FilterMetadata = service.initialize("flaky", 1000, Some(0.01)).await.unwrap();
        assert!(metadata.hash_functions > 3);

        let result = service.insert("flaky", "victim").await;
        assert!(matches!(
            result,
            Err(FilterError::Store(StoreError::Connection(_)))
        ));

        // Only the first three positions made it to the store
        let positions: Vec<u64> =
            bit_positions("victim", metadata.hash_functions, metadata.size).collect();
        let mut committed = 0;
        for offset in &positions {
            if store.get_bit("flaky:bits", *offset).await.unwrap() {
                committed += 1;
            }
        }
        assert!(committed <= 3);
        assert!(committed >= 1);

        // The half-inserted key reads as absent, never as an error
        assert!(!service.query("flaky", "victim").await.unwrap());
    }

    #[tokio::test]
    async fn test_queries_unaffected_by_write_failures() {
        init_tracing();
        let store = Arc::new(FlakyStore::new(usize::MAX));
        let service = BloomFilterService::new(store.clone());
        service.initialize("ok", 100, None).await.unwrap();
        service.insert("ok", "present").await.unwrap();

        store.set_bit_budget.store(0, Ordering::SeqCst);

        assert!(service.insert("ok", "later").await.is_err());
        assert!(service.query("ok", "present").await.unwrap());
    }
}
