// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

pub use lms_client::{ChannelNotifier, ClientConfig, LmsClient, MemoryTokenStore, Toast, ToastLevel, TokenStore};
pub use serde_json::json;
pub use similar_asserts::assert_eq;
pub use wiremock::matchers::{body_json, header, method, path, query_param};
pub use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tok-123";

/// A client pointed at a mock backend, with its toasts captured.
pub struct Harness {
    pub server: MockServer,
    pub client: LmsClient,
    pub tokens: Arc<MemoryTokenStore>,
    pub toasts: UnboundedReceiver<Toast>,
}

impl Harness {
    /// Toasts emitted so far, oldest first.
    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        let mut out = Vec::new();
        while let Ok(toast) = self.toasts.try_recv() {
            out.push(toast);
        }
        out
    }
}

/// Harness without a session.
pub async fn harness() -> Harness {
    build(MemoryTokenStore::new()).await
}

/// Harness holding [`TOKEN`].
pub async fn signed_in() -> Harness {
    build(MemoryTokenStore::with_token(TOKEN)).await
}

async fn build(tokens: MemoryTokenStore) -> Harness {
    let server = MockServer::start().await;
    let mut config = ClientConfig::new(server.uri()).unwrap();
    config.cache.retry = 0;
    let tokens = Arc::new(tokens);
    let (notifier, toasts) = ChannelNotifier::new();
    let client = LmsClient::builder(config)
        .tokens(tokens.clone())
        .notifier(Arc::new(notifier))
        .build()
        .unwrap();
    Harness {
        server,
        client,
        tokens,
        toasts,
    }
}

pub fn notification_json(id: &str, read: bool) -> serde_json::Value {
    json!({ "id": id, "title": format!("Notice {}", id), "body": "", "kind": "system", "read": read })
}

pub fn enrollment_json(id: &str, course_id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "courseId": course_id,
        "userId": "u1",
        "status": "active",
        "completedLessonIds": ["l1"],
        "lastPositions": { "l1": 300 },
        "progress": 25,
        "totalLessons": 4
    })
}
