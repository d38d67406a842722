// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};

use lms_core::ManualClock;
use tokio::sync::Notify;

use super::*;

const START_MS: u64 = 1_000_000;

fn setup() -> (QueryCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    (QueryCache::with_clock(clock.clone()), clock)
}

fn options() -> QueryOptions {
    QueryOptions::new(Duration::from_secs(60), Duration::from_secs(300)).retry(0)
}

fn key() -> QueryKey {
    QueryKey::new("courses").with("list")
}

fn counting(
    calls: &Arc<AtomicUsize>,
    value: Vec<u32>,
) -> impl Fn() -> std::future::Ready<Result<Vec<u32>>> + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(value.clone()))
    }
}

fn failing(
    calls: &Arc<AtomicUsize>,
    err: lms_core::Error,
) -> impl Fn() -> std::future::Ready<Result<Vec<u32>>> + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Err(Error::Api(err.clone())))
    }
}

async fn wait_for(cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

#[tokio::test]
async fn first_read_fetches_and_becomes_fresh() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    assert_eq!(cache.state(&key()), EntryState::Empty);

    let data = cache
        .query(key(), options(), counting(&calls, vec![1, 2]))
        .await
        .unwrap();

    assert_eq!(data, vec![1, 2]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.state(&key()), EntryState::Fresh);
}

#[tokio::test]
async fn fresh_read_skips_the_network() {
    let (cache, clock) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();

    clock.advance(Duration::from_secs(59));
    let data = cache
        .query(key(), options(), counting(&calls, vec![2]))
        .await
        .unwrap();

    assert_eq!(data, vec![1]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stale_read_serves_old_data_and_revalidates() {
    let (cache, clock) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();

    clock.advance(Duration::from_secs(60));
    assert_eq!(cache.state(&key()), EntryState::Stale);

    let data = cache
        .query(key(), options(), counting(&calls, vec![2]))
        .await
        .unwrap();
    assert_eq!(data, vec![1]);

    wait_for(|| cache.get_query_data::<Vec<u32>>(&key()) == Some(vec![2])).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.state(&key()), EntryState::Fresh);
}

#[tokio::test]
async fn invalidate_marks_prefix_stale_only() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let detail = QueryKey::new("courses").with("detail").with("c1");
    let other = QueryKey::new("enrollments");
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();
    cache.query(detail.clone(), options(), counting(&calls, vec![2])).await.unwrap();
    cache.query(other.clone(), options(), counting(&calls, vec![3])).await.unwrap();

    let count = cache.invalidate(&QueryKey::new("courses"));

    assert_eq!(count, 2);
    assert_eq!(cache.state(&key()), EntryState::Stale);
    assert_eq!(cache.state(&detail), EntryState::Stale);
    assert_eq!(cache.state(&other), EntryState::Fresh);
}

#[tokio::test]
async fn fetch_query_refetches_stale_entry() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();
    cache.invalidate(&key());

    let data = cache
        .fetch_query(key(), options(), counting(&calls, vec![2]))
        .await
        .unwrap();

    assert_eq!(data, vec![2]);
    assert_eq!(cache.state(&key()), EntryState::Fresh);
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_share_one_request() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let make = || {
        let calls = Arc::clone(&calls);
        move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, Error>(vec![7u32])
            }
        }
    };

    let (a, b) = tokio::join!(
        cache.fetch_query(key(), options(), make()),
        cache.fetch_query(key(), options(), make()),
    );

    assert_eq!(a.unwrap(), vec![7]);
    assert_eq!(b.unwrap(), vec![7]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_fetch_records_error_kind() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    let err = cache
        .query(key(), options(), failing(&calls, lms_core::Error::Forbidden("no".into())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(cache.state(&key()), EntryState::Error(ErrorKind::Forbidden));
    assert!(cache.get_query_data::<Vec<u32>>(&key()).is_none());
}

#[tokio::test]
async fn read_after_error_fetches_again() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let _ = cache
        .query(key(), options(), failing(&calls, lms_core::Error::Network("down".into())))
        .await;

    let data = cache
        .query(key(), options(), counting(&calls, vec![4]))
        .await
        .unwrap();

    assert_eq!(data, vec![4]);
    assert_eq!(cache.state(&key()), EntryState::Fresh);
}

#[tokio::test(start_paused = true)]
async fn retries_retryable_failures_with_backoff() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let started = tokio::time::Instant::now();

    let err = cache
        .query(
            key(),
            options().retry(2),
            failing(&calls, lms_core::Error::Network("down".into())),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // 1s + 2s of backoff
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn does_not_retry_client_errors() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    let _ = cache
        .query(key(), options().retry(3), failing(&calls, lms_core::Error::Unauthorized))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[yare::parameterized(
    first = { 0, 1 },
    second = { 1, 2 },
    third = { 2, 4 },
    capped = { 5, 30 },
    huge = { 40, 30 },
)]
fn backoff_doubles_and_caps(attempt: u32, secs: u64) {
    assert_eq!(options().backoff(attempt), Duration::from_secs(secs));
}

#[tokio::test]
async fn update_query_data_requires_existing_data() {
    let (cache, _) = setup();
    assert!(!cache.update_query_data(&key(), |v: &Vec<u32>| v.clone()));
    assert!(!cache.set_query_data(&key(), vec![1u32]));
    assert!(!cache.contains(&key()));

    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();
    assert!(cache.update_query_data(&key(), |v: &Vec<u32>| {
        let mut v = v.clone();
        v.push(2);
        v
    }));
    assert_eq!(cache.get_query_data::<Vec<u32>>(&key()), Some(vec![1, 2]));
}

#[tokio::test]
async fn update_with_wrong_type_is_rejected() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();

    assert!(!cache.update_query_data(&key(), |s: &String| s.clone()));
    assert_eq!(cache.get_query_data::<Vec<u32>>(&key()), Some(vec![1]));
}

#[tokio::test]
async fn snapshot_restore_round_trips_data() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();

    let snapshot = cache.snapshot(&[QueryKey::new("courses")]);
    assert_eq!(snapshot.len(), 1);
    assert!(cache.apply_optimistic(&key(), |_: &Vec<u32>| vec![9]));
    assert!(cache.is_optimistic(&key()));

    cache.restore(snapshot);

    assert_eq!(cache.get_query_data::<Vec<u32>>(&key()), Some(vec![1]));
    assert!(!cache.is_optimistic(&key()));
}

#[tokio::test]
async fn cancelled_fetch_does_not_overwrite_cache() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();
    cache.invalidate(&key());

    let gate = Arc::new(Notify::new());
    let handle = {
        let cache = cache.clone();
        let gate = Arc::clone(&gate);
        tokio::spawn(async move {
            cache
                .fetch_query(key(), options(), move || {
                    let gate = Arc::clone(&gate);
                    async move {
                        gate.notified().await;
                        Ok::<_, Error>(vec![2u32])
                    }
                })
                .await
        })
    };
    wait_for(|| cache.state(&key()) == EntryState::Fetching).await;

    cache.cancel(&key());
    cache.apply_optimistic(&key(), |_: &Vec<u32>| vec![3]);
    gate.notify_one();

    assert_eq!(handle.await.unwrap().unwrap(), vec![2]);
    assert_eq!(cache.get_query_data::<Vec<u32>>(&key()), Some(vec![3]));
}

#[tokio::test]
async fn invalidation_during_fetch_leaves_result_stale() {
    let (cache, _) = setup();
    let gate = Arc::new(Notify::new());
    let handle = {
        let cache = cache.clone();
        let gate = Arc::clone(&gate);
        tokio::spawn(async move {
            cache
                .fetch_query(key(), options(), move || {
                    let gate = Arc::clone(&gate);
                    async move {
                        gate.notified().await;
                        Ok::<_, Error>(vec![1u32])
                    }
                })
                .await
        })
    };
    wait_for(|| cache.state(&key()) == EntryState::Fetching).await;

    assert_eq!(cache.invalidate(&QueryKey::new("courses")), 1);
    gate.notify_one();

    assert_eq!(handle.await.unwrap().unwrap(), vec![1]);
    assert_eq!(cache.get_query_data::<Vec<u32>>(&key()), Some(vec![1]));
    assert_eq!(cache.state(&key()), EntryState::Stale);

    let calls = Arc::new(AtomicUsize::new(0));
    cache.fetch_query(key(), options(), counting(&calls, vec![2])).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.state(&key()), EntryState::Fresh);
}

#[tokio::test]
async fn plain_update_keeps_pending_optimistic_flag() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();

    assert!(cache.apply_optimistic(&key(), |_: &Vec<u32>| vec![1, 2]));
    assert!(cache.update_query_data(&key(), |v: &Vec<u32>| {
        let mut next = v.clone();
        next.push(3);
        next
    }));
    assert!(cache.is_optimistic(&key()));
    assert_eq!(cache.get_query_data::<Vec<u32>>(&key()), Some(vec![1, 2, 3]));

    cache.invalidate(&key());
    cache.fetch_query(key(), options(), counting(&calls, vec![4])).await.unwrap();
    assert!(!cache.is_optimistic(&key()));
}

#[tokio::test]
async fn gc_evicts_idle_entries() {
    let (cache, clock) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let short = QueryOptions::new(Duration::from_secs(1), Duration::from_secs(10)).retry(0);
    cache.query(key(), short, counting(&calls, vec![1])).await.unwrap();

    clock.advance(Duration::from_secs(9));
    assert_eq!(cache.collect_garbage(), 0);

    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.collect_garbage(), 1);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn access_extends_gc_window() {
    let (cache, clock) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let opts = QueryOptions::new(Duration::from_secs(60), Duration::from_secs(10)).retry(0);
    cache.query(key(), opts, counting(&calls, vec![1])).await.unwrap();

    clock.advance(Duration::from_secs(8));
    cache.query(key(), opts, counting(&calls, vec![1])).await.unwrap();
    clock.advance(Duration::from_secs(8));

    assert_eq!(cache.collect_garbage(), 0);
    assert!(cache.contains(&key()));
}

#[tokio::test]
async fn remove_and_clear_evict() {
    let (cache, _) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.query(key(), options(), counting(&calls, vec![1])).await.unwrap();
    cache
        .query(QueryKey::new("me"), options(), counting(&calls, vec![2]))
        .await
        .unwrap();

    assert_eq!(cache.remove(&QueryKey::new("courses")), 1);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.state(&QueryKey::new("me")), EntryState::Empty);
}

#[tokio::test(start_paused = true)]
async fn spawn_gc_stops_on_cancel() {
    let (cache, _) = setup();
    let cancel = CancellationToken::new();
    let handle = cache.spawn_gc(Duration::from_secs(1), cancel.clone());

    tokio::time::sleep(Duration::from_secs(3)).await;
    cancel.cancel();

    handle.await.unwrap();
}
