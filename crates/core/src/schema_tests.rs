// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::ErrorKind;
use crate::models::{Notification, UnreadCount};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Pair {
    left: String,
    right: String,
}

impl Validate for Pair {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("left", &self.left);
        v.non_empty("right", &self.right);
    }
}

#[derive(Debug, Deserialize)]
struct Outer {
    pairs: Vec<Pair>,
    head: Pair,
}

impl Validate for Outer {
    fn validate(&self, v: &mut Violations) {
        v.nested("head", &self.head);
        v.each("pairs", &self.pairs);
    }
}

#[test]
fn decode_collects_all_nested_violations() {
    let body = br#"{"head":{"left":"","right":"x"},"pairs":[{"left":"a","right":"b"},{"left":"a","right":" "}]}"#;
    let err = decode::<Outer>(body).unwrap_err();
    let fields: Vec<&str> = err.fields().iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["head.left", "pairs[1].right"]);
}

#[test]
fn decode_reports_structural_errors_as_validation() {
    let err = decode::<Outer>(br#"{"head":{"left":"a"}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn decode_empty_body_as_unit() {
    decode::<()>(b"").unwrap();
    decode::<()>(b"  \n").unwrap();
}

#[test]
fn decode_null_as_none() {
    let value: Option<UnreadCount> = decode(b"null").unwrap();
    assert!(value.is_none());
}

#[test]
fn vec_paths_are_indexed() {
    let err = decode::<Vec<Notification>>(br#"[{"id":"n1","title":"ok"},{"id":"","title":"bad"}]"#)
        .unwrap_err();
    assert_eq!(err.fields()[0].field, "[1].id");
}

#[test]
fn in_range_and_non_negative() {
    let mut v = Violations::new();
    v.in_range("rating", 5.5, 0.0, 5.0);
    v.non_negative("price", -0.01);
    v.in_range("ok", 2.0, 0.0, 5.0);
    let errors = v.into_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].field, "rating");
    assert_eq!(errors[1].field, "price");
}

#[test]
fn check_passes_valid_values() {
    check(&Pair {
        left: "a".into(),
        right: "b".into(),
    })
    .unwrap();
}

#[test]
fn check_input_reports_invalid_input() {
    let err = check_input(&Pair {
        left: " ".into(),
        right: "b".into(),
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("invalid input"));
    assert_eq!(err.fields()[0].field, "left");
}
