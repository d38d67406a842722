// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache key builders.
//!
//! Each resource owns one root key; list and detail keys hang off it so a
//! mutation can invalidate everything it touches with a single prefix.

use lms_core::models::CourseFilters;

use crate::cache::QueryKey;

pub fn me() -> QueryKey {
    QueryKey::new("me")
}

pub fn courses() -> QueryKey {
    QueryKey::new("courses")
}

pub fn course_list(filters: &CourseFilters) -> QueryKey {
    courses().with("list").param(filters)
}

pub fn course_detail(course_id: &str) -> QueryKey {
    courses().with("detail").with(course_id)
}

pub fn lesson(course_id: &str, lesson_id: &str) -> QueryKey {
    courses().with("lesson").with(course_id).with(lesson_id)
}

pub fn enrollments() -> QueryKey {
    QueryKey::new("enrollments")
}

pub fn enrollment_list() -> QueryKey {
    enrollments().with("list")
}

pub fn enrollment_for_course(course_id: &str) -> QueryKey {
    enrollments().with("course").with(course_id)
}

pub fn assignments() -> QueryKey {
    QueryKey::new("assignments")
}

pub fn assignment_list(course_id: &str) -> QueryKey {
    assignments().with("list").with(course_id)
}

pub fn assignment_detail(assignment_id: &str) -> QueryKey {
    assignments().with("detail").with(assignment_id)
}

pub fn submission(assignment_id: &str) -> QueryKey {
    QueryKey::new("submissions").with(assignment_id)
}

pub fn payments() -> QueryKey {
    QueryKey::new("payments")
}

pub fn payment_history() -> QueryKey {
    payments().with("history")
}

pub fn notifications() -> QueryKey {
    QueryKey::new("notifications")
}

pub fn notification_list() -> QueryKey {
    notifications().with("list")
}

pub fn unread_count() -> QueryKey {
    notifications().with("unread-count")
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
