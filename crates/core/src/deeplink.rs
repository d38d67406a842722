// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deep-link remapping for push notifications.
//!
//! Notifications carry web-style paths (`/courses/c1/lessons/l2`). The mobile
//! app routes on its own names, so inbound links are remapped before
//! navigation:
//!
//! | web path                      | mobile route         |
//! |-------------------------------|----------------------|
//! | `/`, `/dashboard`             | `home`               |
//! | `/courses`                    | `courses`            |
//! | `/courses/{id}`               | `course/{id}`        |
//! | `/courses/{id}/lessons/{lid}` | `lesson/{id}/{lid}`  |
//! | `/assignments/{id}`           | `assignment/{id}`    |
//! | `/notifications`              | `notifications`      |
//! | `/payments`                   | `payments`           |

use url::Url;

/// A resolved mobile route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MobileRoute {
    Home,
    Courses,
    Course { course_id: String },
    Lesson { course_id: String, lesson_id: String },
    Assignment { assignment_id: String },
    Notifications,
    Payments,
}

impl MobileRoute {
    /// Returns the route string the mobile navigator understands.
    pub fn path(&self) -> String {
        match self {
            MobileRoute::Home => "home".to_string(),
            MobileRoute::Courses => "courses".to_string(),
            MobileRoute::Course { course_id } => format!("course/{}", course_id),
            MobileRoute::Lesson {
                course_id,
                lesson_id,
            } => format!("lesson/{}/{}", course_id, lesson_id),
            MobileRoute::Assignment { assignment_id } => format!("assignment/{}", assignment_id),
            MobileRoute::Notifications => "notifications".to_string(),
            MobileRoute::Payments => "payments".to_string(),
        }
    }
}

/// Remaps a web URL or path to a mobile route.
///
/// Absolute URLs are reduced to their path; query strings and fragments are
/// ignored. Returns `None` for paths the app has no screen for.
pub fn to_mobile_route(link: &str) -> Option<MobileRoute> {
    let path = match Url::parse(link) {
        Ok(url) if url.has_host() => url.path().to_string(),
        _ => strip_query(link).to_string(),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] | ["dashboard"] => Some(MobileRoute::Home),
        ["courses"] => Some(MobileRoute::Courses),
        ["courses", id] => Some(MobileRoute::Course {
            course_id: (*id).to_string(),
        }),
        ["courses", id, "lessons", lesson] => Some(MobileRoute::Lesson {
            course_id: (*id).to_string(),
            lesson_id: (*lesson).to_string(),
        }),
        ["assignments", id] => Some(MobileRoute::Assignment {
            assignment_id: (*id).to_string(),
        }),
        ["notifications"] => Some(MobileRoute::Notifications),
        ["payments"] | ["payments", "history"] => Some(MobileRoute::Payments),
        _ => None,
    }
}

fn strip_query(link: &str) -> &str {
    let end = link.find(['?', '#']).unwrap_or(link.len());
    &link[..end]
}

#[cfg(test)]
#[path = "deeplink_tests.rs"]
mod tests;
