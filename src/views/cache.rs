//! Caching wrapper that de-duplicates concurrent view loads.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::{FutureExt, Shared};

use crate::views::loader::{ViewFuture, ViewId, ViewLoader};

/// Caches the result of every load. In-flight loads are shared, so N
/// concurrent navigations to the same lazy view hit the inner loader once.
/// Failed loads are evicted and retried on the next request.
pub struct CachingLoader<L> {
    inner: L,
    entries: Arc<DashMap<ViewId, Shared<ViewFuture>>>,
}

impl<L: ViewLoader> CachingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Drop a cached view so the next load reads it again.
    pub fn invalidate(&self, id: &ViewId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached or in-flight entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: fmt::Debug> fmt::Debug for CachingLoader<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingLoader")
            .field("inner", &self.inner)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<L: ViewLoader> ViewLoader for CachingLoader<L> {
    fn load_view(&self, id: &ViewId) -> ViewFuture {
        let shared = self
            .entries
            .entry(id.clone())
            .or_insert_with(|| self.inner.load_view(id).shared())
            .clone();

        let entries = Arc::clone(&self.entries);
        let id = id.clone();

        async move {
            let result = shared.clone().await;
            if let Err(e) = &result {
                tracing::warn!(view = %id, error = %e, "View load failed, evicting from cache");
                entries.remove_if(&id, |_, cached| cached.ptr_eq(&shared));
            }
            result
        }
        .boxed()
    }
}
