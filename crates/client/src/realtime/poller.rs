// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::SharedConnectionStatus;

/// Calls `refresh` every `interval` while the realtime stream is down.
///
/// Ticks while connected are skipped; the bridge keeps the cache current
/// then. Stops when `cancel` fires.
pub fn spawn_fallback_poller<F, Fut>(
    status: Arc<SharedConnectionStatus>,
    interval: Duration,
    cancel: CancellationToken,
    refresh: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if status.is_connected() {
                        continue;
                    }
                    debug!(status = %status.status_string(), "polling notifications");
                    refresh().await;
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
