// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pushes realtime events into the query cache.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lms_core::models::{Notification, UnreadCount};
use lms_core::RealtimeEvent;

use super::transport::{EventTransport, TransportError};
use super::{ConnectionStatus, SharedConnectionStatus};
use crate::api::keys;
use crate::cache::QueryCache;
use crate::config::RealtimeConfig;
use crate::error::{Error, Result};

/// Long-running subscriber that keeps the notification cache current.
pub struct NotificationBridge<T: EventTransport> {
    transport: T,
    cache: QueryCache,
    status: Arc<SharedConnectionStatus>,
    config: RealtimeConfig,
}

impl<T: EventTransport> NotificationBridge<T> {
    pub fn new(
        transport: T,
        cache: QueryCache,
        status: Arc<SharedConnectionStatus>,
        config: RealtimeConfig,
    ) -> Self {
        NotificationBridge {
            transport,
            cache,
            status,
            config,
        }
    }

    pub fn status(&self) -> &Arc<SharedConnectionStatus> {
        &self.status
    }

    /// Runs until `cancel` fires, reconnecting whenever the stream drops.
    ///
    /// # Errors
    ///
    /// Returns the unauthorized error if the server rejects the session, or
    /// [`Error::NotConnected`] once `max_retries` consecutive attempts fail.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        let result = self.run_inner(&cancel).await;
        self.status.set(ConnectionStatus::Disconnected);
        self.status.set_attempt(0);
        if self.transport.is_connected() {
            if let Err(e) = self.transport.disconnect().await {
                debug!("disconnect after shutdown failed: {}", e);
            }
        }
        result
    }

    async fn run_inner(&mut self, cancel: &CancellationToken) -> Result<()> {
        loop {
            if !self.connect_with_retry(cancel).await? {
                return Ok(());
            }
            info!("realtime stream connected");

            loop {
                let next = tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    next = self.transport.recv() => next,
                };
                match next {
                    Ok(Some(event)) => ingest_event(&self.cache, event),
                    Ok(None) => {
                        info!("realtime stream closed by server");
                        break;
                    }
                    Err(e) => {
                        warn!("realtime stream dropped: {}", e);
                        break;
                    }
                }
            }
            self.status.set(ConnectionStatus::Disconnected);

            // Pause before reconnecting so a flapping stream cannot spin.
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_millis(self.config.initial_delay_ms)) => {}
            }
        }
    }

    /// Connects with exponential backoff. Returns false if cancelled.
    async fn connect_with_retry(&mut self, cancel: &CancellationToken) -> Result<bool> {
        let mut attempt = 0u32;
        let mut delay_ms = self.config.initial_delay_ms;

        loop {
            if cancel.is_cancelled() {
                return Ok(false);
            }

            attempt = attempt.saturating_add(1);
            self.status.set(ConnectionStatus::Connecting);
            self.status.set_attempt(attempt);

            let result = tokio::select! {
                _ = cancel.cancelled() => return Ok(false),
                result = self.transport.connect() => result,
            };

            match result {
                Ok(()) => {
                    self.status.set(ConnectionStatus::Connected);
                    self.status.set_attempt(0);
                    return Ok(true);
                }
                Err(TransportError::Unauthorized) => {
                    warn!("realtime stream rejected the session");
                    return Err(lms_core::Error::Unauthorized.into());
                }
                Err(e) => {
                    // 0 = unlimited
                    if self.config.max_retries > 0 && attempt >= self.config.max_retries {
                        warn!(attempts = attempt, "giving up on realtime stream: {}", e);
                        return Err(Error::NotConnected);
                    }
                    debug!(attempt, delay_ms, "realtime connect failed: {}", e);

                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(false),
                        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                    }
                    delay_ms = std::cmp::min(
                        delay_ms.saturating_mul(2),
                        self.config.max_delay_secs.saturating_mul(1000),
                    );
                }
            }
        }
    }
}

/// Applies one realtime event to the cache.
///
/// New notifications are prepended to the cached list unless their id is
/// already present, and bump the cached unread count when unread. With no
/// cached list the notification keys are invalidated instead.
pub fn ingest_event(cache: &QueryCache, event: RealtimeEvent) {
    match event {
        RealtimeEvent::Notification { notification } => ingest_notification(cache, notification),
        RealtimeEvent::UnreadCount { count } => {
            cache.set_query_data(&keys::unread_count(), UnreadCount { count });
        }
        RealtimeEvent::Ping => debug!("realtime keepalive"),
        RealtimeEvent::Unknown => debug!("ignoring unknown realtime event"),
    }
}

fn ingest_notification(cache: &QueryCache, notification: Notification) {
    let unread = !notification.read;
    let id = notification.id.clone();
    let mut inserted = false;

    let cached = cache.update_query_data(&keys::notification_list(), |list: &Vec<Notification>| {
        if list.iter().any(|n| n.id == notification.id) {
            return list.clone();
        }
        inserted = true;
        let mut next = Vec::with_capacity(list.len() + 1);
        next.push(notification);
        next.extend(list.iter().cloned());
        next
    });

    if !cached {
        debug!(%id, "notification list not cached, invalidating");
        cache.invalidate(&keys::notifications());
        return;
    }
    if !inserted {
        debug!(%id, "duplicate notification ignored");
        return;
    }
    debug!(%id, "notification received");
    if unread {
        cache.update_query_data(&keys::unread_count(), |c: &UnreadCount| UnreadCount {
            count: c.count.saturating_add(1),
        });
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
