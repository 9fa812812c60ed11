//! Process-wide loader for top-level wiring.
//!
//! Library code should take a `ConfigLoader` (or `Arc<ConfigLoader>`)
//! explicitly. The shared instance exists so an application has one cache per
//! process without threading it through every call site.

use std::sync::{Arc, Mutex, PoisonError};

use crate::loader::{ConfigLoader, LoaderOptions};

static SHARED: Mutex<Option<Arc<ConfigLoader>>> = Mutex::new(None);

/// Get the shared loader, creating it on first use.
///
/// The path is resolved from the environment when the loader is created.
pub fn shared_loader() -> Arc<ConfigLoader> {
    init_shared_loader(LoaderOptions::default())
}

/// Get the shared loader, creating it with `options` on first use.
///
/// `options` are ignored once the loader exists, so top-level wiring should
/// call this before anything touches [`shared_loader`].
pub fn init_shared_loader(options: LoaderOptions) -> Arc<ConfigLoader> {
    let mut shared = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(shared.get_or_insert_with(|| Arc::new(ConfigLoader::new(options))))
}

/// Drop the shared loader so the next access re-resolves the path.
///
/// Test support only. Callers still holding the old `Arc` keep their cache.
#[cfg(any(test, feature = "test-utils"))]
pub fn reset_shared_loader() {
    let mut shared = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
    *shared = None;
}
