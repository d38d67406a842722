// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource reads and writes.
//!
//! Reads go through the query cache under a key from [`keys`]. Writes go
//! straight to the HTTP client, then invalidate the keys they affect; the
//! optimistic ones snapshot and roll back through
//! [`OptimisticUpdate`](crate::cache::OptimisticUpdate).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use lms_core::Validate;

use crate::error::{Error, Result};
use crate::http::HttpClient;

mod assignments;
mod auth;
mod content;
mod courses;
mod enrollments;
pub mod keys;
mod notifications;
mod payments;

pub use assignments::AssignmentsApi;
pub use auth::AuthApi;
pub use content::{ContentApi, PlaybackSession, PLAYBACK_REFRESH_MARGIN};
pub use courses::CoursesApi;
pub use enrollments::EnrollmentsApi;
pub use notifications::NotificationsApi;
pub use payments::PaymentsApi;

pub(crate) type BoxFetch<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Repeatable GET for the cache. Each call issues a fresh request.
pub(crate) fn get_fetcher<T>(
    http: &Arc<HttpClient>,
    path: String,
    query: Vec<(String, String)>,
) -> impl Fn() -> BoxFetch<T> + Send + Sync + 'static
where
    T: DeserializeOwned + Validate + Send + 'static,
{
    let http = Arc::clone(http);
    move || {
        let http = Arc::clone(&http);
        let path = path.clone();
        let query = query.clone();
        Box::pin(async move { http.get::<T>(&path, &query).await })
    }
}

/// Like [`get_fetcher`], but a `404` reads as `None`.
pub(crate) fn optional_fetcher<T>(
    http: &Arc<HttpClient>,
    path: String,
) -> impl Fn() -> BoxFetch<Option<T>> + Send + Sync + 'static
where
    T: DeserializeOwned + Validate + Send + 'static,
{
    let http = Arc::clone(http);
    move || {
        let http = Arc::clone(&http);
        let path = path.clone();
        Box::pin(async move {
            match http.get::<Option<T>>(&path, &[]).await {
                Err(Error::Api(lms_core::Error::Unknown {
                    status: Some(404), ..
                })) => Ok(None),
                other => other,
            }
        })
    }
}

/// Percent-encodes one path segment.
pub(crate) fn segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
