// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The client facade that wires the HTTP adapter, cache, notifier and
//! realtime bridge together.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lms_core::{ClockSource, SystemClock};

use crate::api::{
    AssignmentsApi, AuthApi, ContentApi, CoursesApi, EnrollmentsApi, NotificationsApi, PaymentsApi,
};
use crate::cache::{QueryCache, QueryOptions};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::notify::{Notifier, Toast, TracingNotifier};
use crate::realtime::{NotificationBridge, SharedConnectionStatus, SseTransport};
use crate::token::{FileTokenStore, TokenStore};

struct Inner {
    config: ClientConfig,
    http: Arc<HttpClient>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    status: Arc<SharedConnectionStatus>,
    clock: Arc<dyn ClockSource>,
}

/// Handle to the LMS backend. Clones share one cache and one session.
#[derive(Clone)]
pub struct LmsClient {
    inner: Arc<Inner>,
}

/// Optional collaborators for [`LmsClient`].
pub struct LmsClientBuilder {
    config: ClientConfig,
    tokens: Option<Arc<dyn TokenStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn ClockSource>>,
}

impl LmsClientBuilder {
    /// Token storage (default: a [`FileTokenStore`] at the configured path).
    pub fn tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Toast sink (default: [`TracingNotifier`]).
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Time source for cache staleness and playback refresh.
    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<LmsClient> {
        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => Arc::new(FileTokenStore::new(self.config.token_path()?)),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let http = HttpClient::new(&self.config, tokens)?;
        Ok(LmsClient {
            inner: Arc::new(Inner {
                http: Arc::new(http),
                cache: QueryCache::with_clock(Arc::clone(&clock)),
                notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
                status: Arc::new(SharedConnectionStatus::new()),
                clock,
                config: self.config,
            }),
        })
    }
}

/// Background tasks started by [`LmsClient::spawn_background`].
pub struct BackgroundTasks {
    pub gc: JoinHandle<()>,
    pub bridge: JoinHandle<Result<()>>,
    pub poller: JoinHandle<()>,
}

impl LmsClient {
    /// Creates a client with the default token store and notifier.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> LmsClientBuilder {
        LmsClientBuilder {
            config,
            tokens: None,
            notifier: None,
            clock: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.inner.http
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    pub fn connection_status(&self) -> &Arc<SharedConnectionStatus> {
        &self.inner.status
    }

    pub fn clock(&self) -> &Arc<dyn ClockSource> {
        &self.inner.clock
    }

    /// Returns true while a session token is stored.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.inner.http.tokens().get()?.is_some())
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn courses(&self) -> CoursesApi {
        CoursesApi::new(self.clone())
    }

    pub fn enrollments(&self) -> EnrollmentsApi {
        EnrollmentsApi::new(self.clone())
    }

    pub fn assignments(&self) -> AssignmentsApi {
        AssignmentsApi::new(self.clone())
    }

    pub fn content(&self) -> ContentApi {
        ContentApi::new(self.clone())
    }

    pub fn payments(&self) -> PaymentsApi {
        PaymentsApi::new(self.clone())
    }

    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.clone())
    }

    /// Builds a bridge over the configured SSE endpoint.
    pub fn notification_bridge(&self) -> NotificationBridge<SseTransport> {
        let transport = SseTransport::new(
            Arc::clone(&self.inner.http),
            self.inner.config.realtime.stream_path.clone(),
        );
        NotificationBridge::new(
            transport,
            self.inner.cache.clone(),
            Arc::clone(&self.inner.status),
            self.inner.config.realtime.clone(),
        )
    }

    /// Starts the GC sweeper, the realtime bridge and the polling fallback.
    ///
    /// All three stop when `cancel` fires.
    pub fn spawn_background(&self, cancel: CancellationToken) -> BackgroundTasks {
        let gc_interval = Duration::from_secs(self.inner.config.cache.gc_interval_secs.max(1));
        let gc = self.inner.cache.spawn_gc(gc_interval, cancel.clone());

        let bridge = self.notification_bridge();
        let bridge_cancel = cancel.clone();
        let bridge = tokio::spawn(async move {
            let result = bridge.run(bridge_cancel).await;
            if let Err(ref e) = result {
                warn!("realtime bridge stopped: {}", e);
            }
            result
        });

        let notifications = self.notifications();
        let poller = crate::realtime::spawn_fallback_poller(
            Arc::clone(&self.inner.status),
            self.inner.config.realtime.poll_interval(),
            cancel,
            move || {
                let notifications = notifications.clone();
                async move { notifications.poll().await }
            },
        );

        info!(base_url = %self.inner.config.base_url, "background tasks started");
        BackgroundTasks { gc, bridge, poller }
    }

    /// Read options using the configured cache defaults.
    pub(crate) fn query_options(&self) -> QueryOptions {
        let cache = &self.inner.config.cache;
        QueryOptions::new(
            Duration::from_secs(cache.stale_time_secs),
            Duration::from_secs(cache.gc_time_secs),
        )
        .retry(cache.retry)
    }

    pub(crate) fn toast(&self, toast: Toast) {
        self.inner.notifier.notify(toast);
    }

    /// Toasts the outcome of a write and passes it through.
    pub(crate) fn report<T>(&self, result: Result<T>, success: Option<&str>) -> Result<T> {
        match (&result, success) {
            (Ok(_), Some(message)) => self.toast(Toast::success(message)),
            (Ok(_), None) => {}
            (Err(e), _) => self.toast(Toast::error(user_message(e))),
        }
        result
    }
}

/// First line of an error, without the `hint:` continuation.
fn user_message(e: &crate::error::Error) -> String {
    let text = e.to_string();
    text.lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
