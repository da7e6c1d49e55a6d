//! # Integration Test Flows
//!
//! End-to-end use of `BloomFilterService` over `InMemoryFilterStore`:
//!
//! 1. **Create → insert → query**: the "ids" scenario and the no-false-negative guarantee
//! 2. **Concurrent callers**: independent tasks sharing one store
//! 3. **Re-initialization policy**: overwrite vs fail-if-exists

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use remote_bloom::domain::parameters::compute_parameters;
    use remote_bloom::{
        BloomFilterApi, BloomFilterService, ExistingFilterPolicy, FilterConfigBuilder, FilterError,
        FilterStore, InMemoryFilterStore, Metrics,
    };

    use crate::integration::init_tracing;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn new_service() -> BloomFilterService<InMemoryFilterStore> {
        init_tracing();
        BloomFilterService::new(Arc::new(InMemoryFilterStore::new()))
    }

    fn random_keys(seed: u64, count: usize) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| format!("user_{:016x}", rng.gen::<u64>()))
            .collect()
    }

    // =============================================================================
    // CREATE → INSERT → QUERY
    // =============================================================================

    #[tokio::test]
    async fn test_ids_scenario() {
        let service = new_service();

        let metadata = service.initialize("ids", 1000, Some(0.01)).await.unwrap();
        let expected = compute_parameters(1000, 0.01);
        assert_eq!(metadata.size, expected.size_bits);
        assert_eq!(metadata.hash_functions, expected.hash_functions);

        service.insert("ids", "a").await.unwrap();
        service.insert("ids", "b").await.unwrap();

        assert!(service.query("ids", "a").await.unwrap());
        assert!(service.query("ids", "b").await.unwrap());
        assert!(!service.query("ids", "z").await.unwrap());
    }

    #[tokio::test]
    async fn test_no_false_negatives_under_load() {
        let service = new_service();
        service.initialize("load", 2_000, Some(0.01)).await.unwrap();

        let keys = random_keys(7, 2_000);
        let first = &keys[..100];

        for key in first {
            service.insert("load", key).await.unwrap();
        }
        // Keep filling past the early keys, then beyond planned capacity
        service
            .insert_all("load", keys[100..].iter().chain(random_keys(8, 1_000).iter()))
            .await
            .unwrap();

        for key in &keys {
            assert!(
                service.query("load", key).await.unwrap(),
                "False negative for {}",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_false_positive_rate_bounded() {
        let service = new_service();
        let n = 1_000;
        let target_fpr = 0.01;
        service.initialize("fpr", n, Some(target_fpr)).await.unwrap();

        service
            .insert_all("fpr", (0..n).map(|i| format!("inserted_{}", i)))
            .await
            .unwrap();

        let trials = 20_000;
        let mut false_positives = 0;
        for i in 0..trials {
            if service.query("fpr", &format!("absent_{}", i)).await.unwrap() {
                false_positives += 1;
            }
        }

        let actual = false_positives as f64 / trials as f64;
        assert!(
            actual <= target_fpr * 2.0,
            "Observed FPR {} exceeds 2x target {}",
            actual,
            target_fpr
        );
    }

    #[tokio::test]
    async fn test_repeated_insert_leaves_buffer_unchanged() {
        let service = new_service();
        service.initialize("idem", 100, None).await.unwrap();

        service.insert("idem", "same").await.unwrap();
        let once = service.store().read_bytes("idem:bits").await.unwrap();
        for _ in 0..5 {
            service.insert("idem", "same").await.unwrap();
        }
        let after = service.store().read_bytes("idem:bits").await.unwrap();

        assert_eq!(once, after);
    }

    #[tokio::test]
    async fn test_not_found_is_not_false() {
        let service = new_service();

        let insert = service.insert("never", "a").await;
        let query = service.query("never", "a").await;

        assert!(matches!(insert, Err(FilterError::NotFound(_))));
        assert!(matches!(query, Err(FilterError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filters_are_isolated_by_name() {
        let service = new_service();
        service.initialize("left", 100, None).await.unwrap();
        service.initialize("right", 100, None).await.unwrap();

        service.insert("left", "only-left").await.unwrap();

        assert!(service.query("left", "only-left").await.unwrap());
        assert!(!service.query("right", "only-left").await.unwrap());
    }

    #[tokio::test]
    async fn test_filter_reopened_by_second_service() {
        // A second service over the same store sees the same filter
        init_tracing();
        let store = Arc::new(InMemoryFilterStore::new());
        let writer = BloomFilterService::new(store.clone());
        writer.initialize("shared", 500, None).await.unwrap();
        writer.insert("shared", "k1").await.unwrap();

        let reader = BloomFilterService::new(store);
        assert!(reader.exists("shared").await.unwrap());
        assert!(reader.query("shared", "k1").await.unwrap());
        assert_eq!(
            reader.metadata("shared").await.unwrap(),
            writer.metadata("shared").await.unwrap()
        );
    }

    // =============================================================================
    // CONCURRENT CALLERS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_all_visible() {
        let metrics = Arc::new(Metrics::new());
        let service = Arc::new(new_service().with_metrics(metrics.clone()));
        service.initialize("conc", 4_000, Some(0.01)).await.unwrap();

        let mut handles = Vec::new();
        for worker in 0..8u64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let keys = random_keys(100 + worker, 250);
                for key in &keys {
                    service.insert("conc", key).await.unwrap();
                }
                keys
            }));
        }

        let mut all_keys = HashSet::new();
        for handle in handles {
            all_keys.extend(handle.await.unwrap());
        }

        for key in &all_keys {
            assert!(service.query("conc", key).await.unwrap());
        }
        assert_eq!(metrics.snapshot().elements_inserted, 8 * 250);
    }

    // =============================================================================
    // RE-INITIALIZATION POLICY
    // =============================================================================

    #[tokio::test]
    async fn test_overwrite_resets_filter() {
        let service = new_service();
        service.initialize("reset", 100, None).await.unwrap();
        service.insert("reset", "old").await.unwrap();

        service.initialize("reset", 100, None).await.unwrap();

        assert!(!service.query("reset", "old").await.unwrap());
    }

    #[tokio::test]
    async fn test_fail_if_exists_keeps_filter() {
        init_tracing();
        let config = FilterConfigBuilder::new()
            .existing_filter_policy(ExistingFilterPolicy::FailIfExists)
            .build()
            .unwrap();
        let service =
            BloomFilterService::with_config(Arc::new(InMemoryFilterStore::new()), config).unwrap();

        let original = service.initialize("once", 100, None).await.unwrap();
        service.insert("once", "kept").await.unwrap();

        let again = service.initialize("once", 10_000, Some(0.001)).await;
        assert!(matches!(again, Err(FilterError::AlreadyExists(_))));

        assert_eq!(service.metadata("once").await.unwrap(), original);
        assert!(service.query("once", "kept").await.unwrap());
    }
}
