// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::Error;

fn page(items: Vec<u32>) -> Paginated<u32> {
    let total = items.len() as u64;
    Paginated {
        items,
        page: 1,
        limit: 9,
        total,
        total_pages: total.div_ceil(9),
    }
}

#[test]
fn empty_page_is_empty_not_error() {
    let state: ViewState<Paginated<u32>> = Ok(page(vec![])).into();
    assert!(state.is_empty());
    assert_eq!(state.error(), None);
}

#[test]
fn non_empty_list_is_populated() {
    let state: ViewState<Vec<u32>> = Ok(vec![1, 2]).into();
    assert_eq!(state.data(), Some(&vec![1, 2]));
}

#[test]
fn failure_carries_kind() {
    let state: ViewState<Vec<u32>> = Err(Error::Api(lms_core::Error::Unauthorized)).into();
    assert_eq!(state, ViewState::Error(ErrorKind::Unauthorized));
}

#[test]
fn local_validation_failure_is_validation_kind() {
    let state: ViewState<Vec<u32>> = Err(Error::FieldEmpty { field: "text" }).into();
    assert_eq!(state.error(), Some(ErrorKind::Validation));
}

#[test]
fn pending_is_loading() {
    let state: ViewState<Vec<u32>> = ViewState::from_pending(None);
    assert!(state.is_loading());
    let state: ViewState<Vec<u32>> = ViewState::from_pending(Some(Ok(vec![])));
    assert!(state.is_empty());
}

#[test]
fn missing_enrollment_is_empty() {
    let state: ViewState<Option<String>> = Ok(None).into();
    assert!(state.is_empty());
}

#[test]
fn custom_predicate_decides_emptiness() {
    let state = ViewState::from_result_with(Ok(0u64), |n| *n == 0);
    assert!(state.is_empty());
    let state = ViewState::from_result_with(Ok(3u64), |n| *n == 0);
    assert_eq!(state.map(|n| n * 2), ViewState::Populated(6));
}

#[test]
fn empty_message_names_the_resource() {
    assert_eq!(ViewState::<()>::empty_message("courses"), "No courses found");
}

#[yare::parameterized(
    network = { ErrorKind::Network, "connection" },
    unauthorized = { ErrorKind::Unauthorized, "sign in" },
    forbidden = { ErrorKind::Forbidden, "access" },
    server = { ErrorKind::Server, "try again later" },
)]
fn error_message_matches_kind(kind: ErrorKind, fragment: &str) {
    assert!(ViewState::<()>::error_message(kind).contains(fragment));
}
