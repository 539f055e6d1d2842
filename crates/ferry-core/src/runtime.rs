//! Tokio runtime that drives connection attempts

use std::sync::Arc;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

/// Runtime that owns every adapter's connect task
///
/// `StorageAdapter::new` is synchronous and must start connecting before it
/// returns, with or without a caller runtime. The connect task also has to
/// outlive a caller's `#[tokio::test]` or `block_on` scope while the adapter
/// lives, so it never runs on the caller's runtime.
pub(crate) fn get_runtime() -> Arc<Runtime> {
    static RUNTIME: OnceLock<Arc<Runtime>> = OnceLock::new();

    RUNTIME
        .get_or_init(|| {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .thread_name("ferry-session")
                .build()
                .expect("Failed to create Tokio runtime");

            Arc::new(runtime)
        })
        .clone()
}
