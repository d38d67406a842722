// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-app notifications and push device registration.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use lms_core::models::{DeviceRegistration, Notification, Platform, UnreadCount};
use lms_core::schema::check_input;

use super::{get_fetcher, keys};
use crate::cache::OptimisticUpdate;
use crate::client::LmsClient;
use crate::error::Result;

#[derive(Serialize)]
struct MarkReadRequest<'a> {
    ids: &'a [String],
}

#[derive(Clone)]
pub struct NotificationsApi {
    client: LmsClient,
}

impl NotificationsApi {
    pub(crate) fn new(client: LmsClient) -> Self {
        NotificationsApi { client }
    }

    pub async fn list(&self) -> Result<Vec<Notification>> {
        self.client
            .cache()
            .query(
                keys::notification_list(),
                self.client.query_options(),
                get_fetcher(self.client.http(), "/notifications".to_string(), Vec::new()),
            )
            .await
    }

    pub async fn unread_count(&self) -> Result<UnreadCount> {
        self.client
            .cache()
            .query(
                keys::unread_count(),
                self.client.query_options(),
                get_fetcher(
                    self.client.http(),
                    "/notifications/unread-count".to_string(),
                    Vec::new(),
                ),
            )
            .await
    }

    /// How often a screen showing notifications should refetch: the polling
    /// interval while the realtime stream is down, `None` while it is up.
    pub fn refetch_interval(&self) -> Option<Duration> {
        if self.client.connection_status().is_connected() {
            None
        } else {
            Some(self.client.config().realtime.poll_interval())
        }
    }

    /// Refetches whichever notification reads are cached. Failures are
    /// logged; the next tick tries again.
    pub async fn poll(&self) {
        let cache = self.client.cache();
        let list_key = keys::notification_list();
        if cache.contains(&list_key) {
            cache.invalidate(&list_key);
            let fetched = cache
                .fetch_query(
                    list_key,
                    self.client.query_options(),
                    get_fetcher::<Vec<Notification>>(
                        self.client.http(),
                        "/notifications".to_string(),
                        Vec::new(),
                    ),
                )
                .await;
            if let Err(e) = fetched {
                warn!("notification poll failed: {}", e);
            }
        }

        let count_key = keys::unread_count();
        if cache.contains(&count_key) {
            cache.invalidate(&count_key);
            let fetched = cache
                .fetch_query(
                    count_key,
                    self.client.query_options(),
                    get_fetcher::<UnreadCount>(
                        self.client.http(),
                        "/notifications/unread-count".to_string(),
                        Vec::new(),
                    ),
                )
                .await;
            if let Err(e) = fetched {
                warn!("unread count poll failed: {}", e);
            }
        }
    }

    /// Marks notifications read, optimistically.
    ///
    /// Only items that flip from unread lower the unread count, so repeating
    /// the call (or racing two of them) never double-counts.
    pub async fn mark_read(&self, ids: &[String]) -> Result<()> {
        let ids: Vec<String> = ids
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        let list_key = keys::notification_list();
        let count_key = keys::unread_count();
        let optimistic =
            OptimisticUpdate::begin(self.client.cache(), [list_key.clone(), count_key.clone()]);

        let flipped = self
            .client
            .cache()
            .get_query_data::<Vec<Notification>>(&list_key)
            .map(|list| {
                list.iter()
                    .filter(|n| !n.read && ids.contains(&n.id))
                    .count() as u64
            })
            .unwrap_or(0);
        optimistic.apply(&list_key, |list: &Vec<Notification>| {
            list.iter()
                .map(|n| {
                    if ids.contains(&n.id) {
                        n.marked_read()
                    } else {
                        n.clone()
                    }
                })
                .collect::<Vec<_>>()
        });
        if flipped > 0 {
            optimistic.apply(&count_key, |c: &UnreadCount| UnreadCount {
                count: c.count.saturating_sub(flipped),
            });
        }
        debug!(requested = ids.len(), flipped, "notifications marked read");

        let result = self
            .client
            .http()
            .patch::<_, ()>("/notifications/read", &MarkReadRequest { ids: &ids })
            .await;
        let result = optimistic.settle(result);
        self.client.report(result, None)
    }

    /// Marks every notification read, optimistically zeroing the count.
    pub async fn mark_all_read(&self) -> Result<()> {
        let list_key = keys::notification_list();
        let count_key = keys::unread_count();
        let optimistic =
            OptimisticUpdate::begin(self.client.cache(), [list_key.clone(), count_key.clone()]);

        optimistic.apply(&list_key, |list: &Vec<Notification>| {
            list.iter().map(Notification::marked_read).collect::<Vec<_>>()
        });
        optimistic.apply(&count_key, |_: &UnreadCount| UnreadCount::default());

        let result = self
            .client
            .http()
            .patch::<_, ()>("/notifications/read-all", &serde_json::json!({}))
            .await;
        let result = optimistic.settle(result);
        self.client.report(result, None)
    }

    /// Registers this device for push delivery.
    pub async fn register_device(&self, device_token: &str, platform: Platform) -> Result<()> {
        let registration = DeviceRegistration {
            device_token: device_token.to_string(),
            platform,
        };
        let result = match check_input(&registration) {
            Ok(()) => {
                self.client
                    .http()
                    .post::<_, ()>("/notifications/devices", &registration)
                    .await
            }
            Err(e) => Err(e.into()),
        };
        self.client.report(result, None)
    }
}
