// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot, apply, settle.
//!
//! Every optimistic write in the client goes through [`OptimisticUpdate`]:
//! `begin` cancels in-flight fetches for the affected keys and snapshots them,
//! `apply` rewrites cached data speculatively, and `settle` restores the
//! snapshot if the server rejected the mutation. Affected keys are invalidated
//! on settle whatever the outcome, so the server state always wins in the end.

use tracing::{debug, warn};

use super::key::QueryKey;
use super::store::{CacheSnapshot, QueryCache};
use crate::error::Result;

#[must_use = "an optimistic update must be settled"]
pub struct OptimisticUpdate {
    cache: QueryCache,
    keys: Vec<QueryKey>,
    snapshot: CacheSnapshot,
}

impl OptimisticUpdate {
    /// Cancels fetches under `keys` and snapshots them.
    pub fn begin(cache: &QueryCache, keys: impl IntoIterator<Item = QueryKey>) -> Self {
        let keys: Vec<QueryKey> = keys.into_iter().collect();
        for key in &keys {
            cache.cancel(key);
        }
        let snapshot = cache.snapshot(&keys);
        debug!(keys = keys.len(), saved = snapshot.len(), "optimistic update started");
        OptimisticUpdate {
            cache: cache.clone(),
            keys,
            snapshot,
        }
    }

    /// Speculatively rewrites `key`. Returns false when there is nothing cached.
    pub fn apply<T, F>(&self, key: &QueryKey, f: F) -> bool
    where
        T: Send + Sync + 'static,
        F: FnOnce(&T) -> T,
    {
        self.cache.apply_optimistic(key, f)
    }

    /// Reconciles with the server outcome and passes it through.
    pub fn settle<T>(self, result: Result<T>) -> Result<T> {
        self.settle_with(result, &[])
    }

    /// Like [`settle`](Self::settle), also invalidating `extra` keys.
    pub fn settle_with<T>(self, result: Result<T>, extra: &[QueryKey]) -> Result<T> {
        if let Err(ref e) = result {
            warn!(kind = %e.kind(), "mutation failed, rolling back: {}", e);
            self.cache.restore(self.snapshot);
        }
        for key in self.keys.iter().chain(extra) {
            self.cache.invalidate(key);
        }
        result
    }
}

#[cfg(test)]
#[path = "optimistic_tests.rs"]
mod tests;
