//! Cross-layer integration tests

pub mod flows;
pub mod partial_failure;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary
///
/// Honours `RUST_LOG`; defaults to `remote_bloom=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("remote_bloom=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
