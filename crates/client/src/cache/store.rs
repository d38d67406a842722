// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory query cache.
//!
//! Entries hold type-erased snapshots keyed by [`QueryKey`]. Each entry moves
//! through `empty → fetching → fresh → stale → fetching → fresh | error`; an
//! entry only gains data through a completed fetch, so in-place updates and
//! optimistic writes never create one.
//!
//! The entry map sits behind a `std::sync::Mutex` that is never held across
//! an await. Fetches for one key are serialized by a per-key async lock: a
//! caller that waited on another caller's fetch reuses its outcome instead of
//! issuing a second request.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use lms_core::{ClockSource, ErrorKind, SystemClock};

use super::key::QueryKey;
use crate::error::{Error, Result};

type Data = Arc<dyn Any + Send + Sync>;

/// Upper bound on the delay between fetch retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Observable state of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// No entry, or an entry that has never completed a fetch.
    Empty,
    /// A fetch is in flight (data, if any, is from an earlier fetch).
    Fetching,
    /// Data is within its staleness window.
    Fresh,
    /// Data is past its staleness window or was invalidated.
    Stale,
    /// The last fetch failed.
    Error(ErrorKind),
}

/// Per-read caching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long fetched data counts as fresh.
    pub stale_time: Duration,
    /// How long an unused entry survives before eviction.
    pub gc_time: Duration,
    /// Extra attempts for retryable failures.
    pub retry: u32,
    /// Base delay for the exponential retry backoff.
    pub retry_delay: Duration,
}

impl QueryOptions {
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        QueryOptions {
            stale_time,
            gc_time,
            retry: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (0-based): `base·2ⁿ`, capped at 30s.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay
            .checked_mul(factor)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

struct Entry {
    data: Option<Data>,
    updated_at_ms: u64,
    last_access_ms: u64,
    stale_time: Duration,
    gc_time: Duration,
    invalidated: bool,
    optimistic: bool,
    fetching: bool,
    last_error: Option<lms_core::Error>,
    /// Bumped by `cancel`; fetch results from an older generation are dropped.
    generation: u64,
    /// Bumped each time a fetch settles.
    fetch_seq: u64,
    /// Bumped by `invalidate`; a fetch that started before the bump lands stale.
    invalidations: u64,
}

impl Entry {
    fn new(options: &QueryOptions, now_ms: u64) -> Self {
        Entry {
            data: None,
            updated_at_ms: 0,
            last_access_ms: now_ms,
            stale_time: options.stale_time,
            gc_time: options.gc_time,
            invalidated: false,
            optimistic: false,
            fetching: false,
            last_error: None,
            generation: 0,
            fetch_seq: 0,
            invalidations: 0,
        }
    }

    fn is_stale(&self, now_ms: u64) -> bool {
        self.invalidated
            || self.last_error.is_some()
            || now_ms.saturating_sub(self.updated_at_ms) >= duration_ms(self.stale_time)
    }

    fn state(&self, now_ms: u64) -> EntryState {
        if self.fetching {
            EntryState::Fetching
        } else if let Some(ref e) = self.last_error {
            EntryState::Error(e.kind())
        } else if self.data.is_none() {
            EntryState::Empty
        } else if self.is_stale(now_ms) {
            EntryState::Stale
        } else {
            EntryState::Fresh
        }
    }
}

/// What a fetch saw of its entry when it started.
#[derive(Clone, Copy)]
struct FetchTicket {
    generation: u64,
    invalidations: u64,
}

enum Lookup<T> {
    Fresh(T),
    Stale { data: T, fetching: bool },
    Missing,
}

/// Entry contents captured before an optimistic write.
#[derive(Clone)]
struct SavedEntry {
    data: Option<Data>,
    updated_at_ms: u64,
    invalidated: bool,
}

/// Point-in-time copy of a set of entries, restorable with
/// [`QueryCache::restore`].
#[derive(Clone, Default)]
pub struct CacheSnapshot {
    entries: Vec<(QueryKey, SavedEntry)>,
}

impl CacheSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.iter().map(|(k, _)| k)
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    locks: Mutex<HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>>,
    clock: Arc<dyn ClockSource>,
}

/// Shared handle to the query cache. Clones refer to the same cache.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a cache with a custom time source (for testing).
    pub fn with_clock(clock: Arc<dyn ClockSource>) -> Self {
        QueryCache {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                locks: Mutex::new(HashMap::new()),
                clock,
            }),
        }
    }

    fn now_ms(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key_lock(&self, key: &QueryKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Reads through the cache.
    ///
    /// Fresh data is returned as is. Stale data is returned immediately while
    /// a background refetch runs. Without data the fetch is awaited.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        match self.lookup::<T>(&key, &options) {
            Lookup::Fresh(data) => Ok(data),
            Lookup::Stale { data, fetching } => {
                if !fetching {
                    debug!(%key, "serving stale data, revalidating");
                    let cache = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = cache.fetch_query(key.clone(), options, fetcher).await {
                            warn!(%key, "background refetch failed: {}", e);
                        }
                    });
                }
                Ok(data)
            }
            Lookup::Missing => self.fetch_query(key, options, fetcher).await,
        }
    }

    /// Returns fresh data, fetching unless the entry is already fresh.
    ///
    /// Concurrent callers for the same key share one in-flight fetch.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let seen_seq = self.fetch_seq(&key);
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        if let Some(outcome) = self.settled_since::<T>(&key, seen_seq) {
            return outcome;
        }
        if let Lookup::Fresh(data) = self.lookup::<T>(&key, &options) {
            return Ok(data);
        }

        let ticket = self.begin_fetch(&key, &options);
        let mut attempt = 0;
        let result = loop {
            match fetcher().await {
                Ok(value) => break Ok(value),
                Err(e) if e.is_retryable() && attempt < options.retry => {
                    let delay = options.backoff(attempt);
                    debug!(%key, attempt, ?delay, "fetch failed, retrying: {}", e);
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => break Err(e),
            }
        };
        self.finish_fetch(&key, ticket, result)
    }

    fn fetch_seq(&self, key: &QueryKey) -> u64 {
        self.entries().get(key).map(|e| e.fetch_seq).unwrap_or(0)
    }

    /// Outcome of a fetch that settled while this caller waited for the lock.
    fn settled_since<T: Clone + 'static>(&self, key: &QueryKey, seen_seq: u64) -> Option<Result<T>> {
        let entries = self.entries();
        let entry = entries.get(key)?;
        if entry.fetch_seq == seen_seq {
            return None;
        }
        if let Some(ref e) = entry.last_error {
            return Some(Err(Error::Api(e.clone())));
        }
        entry
            .data
            .as_ref()
            .and_then(|d| d.downcast_ref::<T>())
            .map(|d| Ok(d.clone()))
    }

    fn lookup<T: Clone + 'static>(&self, key: &QueryKey, options: &QueryOptions) -> Lookup<T> {
        let now = self.now_ms();
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return Lookup::Missing;
        };
        entry.last_access_ms = now;
        entry.stale_time = options.stale_time;
        entry.gc_time = options.gc_time;

        let Some(data) = entry.data.as_ref() else {
            return Lookup::Missing;
        };
        let Some(data) = data.downcast_ref::<T>().cloned() else {
            warn!(%key, "cached data has an unexpected type, refetching");
            return Lookup::Missing;
        };
        if entry.is_stale(now) {
            Lookup::Stale {
                data,
                fetching: entry.fetching,
            }
        } else {
            Lookup::Fresh(data)
        }
    }

    fn begin_fetch(&self, key: &QueryKey, options: &QueryOptions) -> FetchTicket {
        let now = self.now_ms();
        let mut entries = self.entries();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(options, now));
        entry.fetching = true;
        entry.last_access_ms = now;
        debug!(%key, "fetching");
        FetchTicket {
            generation: entry.generation,
            invalidations: entry.invalidations,
        }
    }

    fn finish_fetch<T>(&self, key: &QueryKey, ticket: FetchTicket, result: Result<T>) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.now_ms();
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            debug!(%key, "entry removed during fetch, dropping result");
            return result;
        };
        entry.fetching = false;
        entry.fetch_seq += 1;

        if entry.generation != ticket.generation {
            debug!(%key, "fetch cancelled, dropping result");
            return result;
        }

        match result {
            Ok(value) => {
                entry.data = Some(Arc::new(value.clone()));
                entry.updated_at_ms = now;
                // An invalidation during the fetch may predate the server's answer.
                entry.invalidated = entry.invalidations != ticket.invalidations;
                entry.optimistic = false;
                entry.last_error = None;
                debug!(%key, stale = entry.invalidated, "fetch settled");
                Ok(value)
            }
            Err(e) => {
                let api = match e {
                    Error::Api(ref api) => api.clone(),
                    ref other => lms_core::Error::Unknown {
                        status: None,
                        message: other.to_string(),
                    },
                };
                debug!(%key, kind = %api.kind(), "fetch failed");
                entry.last_error = Some(api);
                Err(e)
            }
        }
    }

    /// Current state of `key`.
    pub fn state(&self, key: &QueryKey) -> EntryState {
        let now = self.now_ms();
        self.entries()
            .get(key)
            .map(|e| e.state(now))
            .unwrap_or(EntryState::Empty)
    }

    /// Returns true while the entry holds speculative, unconfirmed data.
    pub fn is_optimistic(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_some_and(|e| e.optimistic)
    }

    /// Returns the cached value without triggering a fetch.
    pub fn get_query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.entries()
            .get(key)?
            .data
            .as_ref()?
            .downcast_ref::<T>()
            .cloned()
    }

    /// Replaces the data of an entry that already holds data.
    ///
    /// Returns false (and changes nothing) when there is no such entry.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) -> bool {
        self.write(key, false, |_: &T| value)
    }

    /// Rewrites cached data in place.
    ///
    /// Returns false when the key has no data of type `T`.
    pub fn update_query_data<T, F>(&self, key: &QueryKey, f: F) -> bool
    where
        T: Send + Sync + 'static,
        F: FnOnce(&T) -> T,
    {
        self.write(key, false, f)
    }

    /// Like [`update_query_data`](Self::update_query_data) but flags the entry
    /// as optimistic until the next fetch or restore.
    pub(crate) fn apply_optimistic<T, F>(&self, key: &QueryKey, f: F) -> bool
    where
        T: Send + Sync + 'static,
        F: FnOnce(&T) -> T,
    {
        self.write(key, true, f)
    }

    fn write<T, F>(&self, key: &QueryKey, optimistic: bool, f: F) -> bool
    where
        T: Send + Sync + 'static,
        F: FnOnce(&T) -> T,
    {
        let now = self.now_ms();
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        let Some(current) = entry.data.as_ref().and_then(|d| d.downcast_ref::<T>()) else {
            return false;
        };
        let next = f(current);
        entry.data = Some(Arc::new(next));
        entry.updated_at_ms = now;
        // Plain writes keep a pending optimistic flag; only a fetch or restore clears it.
        entry.optimistic |= optimistic;
        debug!(%key, optimistic = entry.optimistic, "updated in place");
        true
    }

    /// Marks every entry under `prefix` stale. Returns how many matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        for (key, entry) in self.entries().iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                entry.invalidations += 1;
                count += 1;
            }
        }
        debug!(%prefix, count, "invalidated");
        count
    }

    /// Drops the results of in-flight fetches under `prefix`.
    pub fn cancel(&self, prefix: &QueryKey) {
        for (key, entry) in self.entries().iter_mut() {
            if key.starts_with(prefix) {
                entry.generation += 1;
            }
        }
    }

    /// Captures every entry under any of `prefixes`.
    pub fn snapshot(&self, prefixes: &[QueryKey]) -> CacheSnapshot {
        let entries = self.entries();
        let saved = entries
            .iter()
            .filter(|(key, _)| prefixes.iter().any(|p| key.starts_with(p)))
            .map(|(key, entry)| {
                (
                    key.clone(),
                    SavedEntry {
                        data: entry.data.clone(),
                        updated_at_ms: entry.updated_at_ms,
                        invalidated: entry.invalidated,
                    },
                )
            })
            .collect();
        CacheSnapshot { entries: saved }
    }

    /// Puts snapshotted data back.
    ///
    /// Entries evicted since the snapshot stay evicted; entries created since
    /// are left alone.
    pub fn restore(&self, snapshot: CacheSnapshot) {
        let mut entries = self.entries();
        for (key, saved) in snapshot.entries {
            if let Some(entry) = entries.get_mut(&key) {
                entry.data = saved.data;
                entry.updated_at_ms = saved.updated_at_ms;
                entry.invalidated = saved.invalidated;
                entry.optimistic = false;
                debug!(%key, "restored");
            }
        }
    }

    /// Evicts every entry under `prefix`. In-flight fetches for them are dropped.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    /// Evicts everything.
    pub fn clear(&self) {
        self.entries().clear();
        debug!("cache cleared");
    }

    /// Evicts entries unused for longer than their GC window.
    ///
    /// Entries with a fetch in flight are kept.
    pub fn collect_garbage(&self) -> usize {
        let now = self.now_ms();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, e| {
            e.fetching || now.saturating_sub(e.last_access_ms) < duration_ms(e.gc_time)
        });
        let evicted = before - entries.len();
        drop(entries);

        if evicted > 0 {
            let live: Vec<QueryKey> = self.entries().keys().cloned().collect();
            let mut locks = self.inner.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|key, lock| live.contains(key) || Arc::strong_count(lock) > 1);
            debug!(evicted, "garbage collected");
        }
        evicted
    }

    /// Runs [`collect_garbage`](Self::collect_garbage) every `interval` until
    /// `cancel` fires.
    pub fn spawn_gc(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        cache.collect_garbage();
                    }
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries().contains_key(key)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
