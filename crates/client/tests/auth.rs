// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;
use common::assert_eq;

use lms_client::api::keys;
use lms_client::Error;
use lms_core::ErrorKind;

fn user_json() -> serde_json::Value {
    json!({ "id": "u1", "email": "ada@example.com", "name": "Ada", "role": "student" })
}

#[tokio::test]
async fn login_stores_token_and_authorizes_later_requests() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN, "user": user_json() })),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.client.auth().login(" ada@example.com ", "pw").await.unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(h.tokens.get().unwrap().as_deref(), Some(TOKEN));
    assert!(h.client.is_authenticated().unwrap());

    assert_eq!(h.client.auth().me().await.unwrap().name, "Ada");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let h = harness().await;
    let err = h.client.auth().login("", "pw").await.unwrap_err();
    assert!(matches!(err, Error::FieldEmpty { field: "email" }));
    let err = h.client.auth().login("ada@example.com", "").await.unwrap_err();
    assert!(matches!(err, Error::FieldEmpty { field: "password" }));
}

#[tokio::test]
async fn failed_login_toasts_error() {
    let mut h = harness().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let err = h.client.auth().login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!h.client.is_authenticated().unwrap());

    let toasts = h.drain_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);

    h.client.auth().login("", "pw").await.unwrap_err();
    assert_eq!(h.drain_toasts()[0].level, ToastLevel::Error);
}

#[tokio::test]
async fn unauthorized_response_clears_token() {
    let h = signed_in().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let err = h.client.auth().me().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(h.tokens.get().unwrap(), None);
    assert!(!h.client.is_authenticated().unwrap());
}

#[tokio::test]
async fn logout_clears_token_and_cache() {
    let h = signed_in().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&h.server)
        .await;
    h.client.auth().me().await.unwrap();
    assert!(h.client.cache().contains(&keys::me()));

    h.client.auth().logout().unwrap();
    assert_eq!(h.tokens.get().unwrap(), None);
    assert!(h.client.cache().is_empty());
}
