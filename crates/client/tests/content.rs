// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;
use common::assert_eq;

use std::sync::Arc;
use std::time::Duration;

use lms_core::models::UploadRequest;
use lms_core::{ErrorKind, ManualClock};

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

fn upload_request() -> UploadRequest {
    UploadRequest {
        course_id: "c1".to_string(),
        lesson_id: Some("l1".to_string()),
        filename: "intro.mp4".to_string(),
        content_type: "video/mp4".to_string(),
        size: 0,
    }
}

#[tokio::test]
async fn upload_runs_presigned_flow_with_checksum() {
    let mut h = signed_in().await;
    let storage_url = format!("{}/storage/obj-1?sig=abc", h.server.uri());
    Mock::given(method("POST"))
        .and(path("/content/uploads"))
        .and(body_json(json!({
            "courseId": "c1", "lessonId": "l1", "filename": "intro.mp4",
            "contentType": "video/mp4", "size": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadId": "up-1", "uploadUrl": storage_url
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/storage/obj-1"))
        .and(query_param("sig", "abc"))
        .and(header("content-type", "video/mp4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/content/uploads/up-1/complete"))
        .and(body_json(json!({ "size": 5, "sha256": HELLO_SHA256 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let ticket = h
        .client
        .content()
        .upload(upload_request(), b"hello".to_vec())
        .await
        .unwrap();
    assert_eq!(ticket.upload_id, "up-1");
    assert_eq!(h.drain_toasts(), vec![Toast::success("Upload complete")]);

    let requests = h.server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.url.path() == "/storage/obj-1")
        .unwrap();
    assert_eq!(put.body, b"hello");
    assert!(put.headers.get("authorization").is_none());
}

#[tokio::test]
async fn expired_storage_url_fails_upload() {
    let mut h = signed_in().await;
    let storage_url = format!("{}/storage/obj-1", h.server.uri());
    Mock::given(method("POST"))
        .and(path("/content/uploads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadId": "up-1", "uploadUrl": storage_url
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/storage/obj-1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/content/uploads/up-1/complete"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .content()
        .upload(upload_request(), b"hello".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(h.tokens.get().unwrap().as_deref(), Some(TOKEN));
    assert_eq!(h.drain_toasts()[0].level, ToastLevel::Error);
}

#[tokio::test]
async fn empty_upload_is_rejected_locally() {
    let h = signed_in().await;
    let err = h
        .client
        .content()
        .upload(upload_request(), Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn playback_session_renews_grant_near_expiry() {
    let server = MockServer::start().await;
    // 2026-01-01T00:00:00Z
    let start_ms = 1_767_225_600_000;
    let clock = Arc::new(ManualClock::new(start_ms));
    let client = LmsClient::builder(ClientConfig::new(server.uri()).unwrap())
        .tokens(Arc::new(MemoryTokenStore::with_token(TOKEN)))
        .clock(clock.clone())
        .build()
        .unwrap();
    Mock::given(method("GET"))
        .and(path("/content/lessons/l1/playback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://cdn.example.com/l1.m3u8",
            "token": "play-1",
            "expiresAt": "2026-01-01T00:05:00Z",
            "qualities": [
                { "label": "360p", "height": 360, "bitrateKbps": 800 },
                { "label": "1080p", "height": 1080, "bitrateKbps": 5000 }
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = client.content().session("l1");
    assert!(session.needs_refresh());
    assert_eq!(session.grant().await.unwrap().token, "play-1");

    clock.advance(Duration::from_secs(3 * 60));
    assert!(!session.needs_refresh());
    session.grant().await.unwrap();

    clock.advance(Duration::from_secs(61));
    assert!(session.needs_refresh());
    session.grant().await.unwrap();

    assert_eq!(session.select_quality(10_000).unwrap().label, "1080p");
    assert_eq!(session.select_quality(1_000).unwrap().label, "360p");
    session.set_quality_override(Some("1080p".to_string()));
    assert_eq!(session.select_quality(1_000).unwrap().label, "1080p");
}
