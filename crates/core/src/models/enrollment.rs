// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Validate, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

/// A learner's membership in a course and their progress through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub course_id: String,
    pub user_id: String,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub completed_lesson_ids: BTreeSet<String>,
    /// Last playback position per lesson, in seconds.
    #[serde(default)]
    pub last_positions: BTreeMap<String, u32>,
    /// Percentage complete, 0..=100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub total_lessons: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// Body of a progress update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub lesson_id: String,
    pub position_secs: u32,
    pub completed: bool,
}

impl Enrollment {
    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.completed_lesson_ids.contains(lesson_id)
    }

    pub fn resume_position(&self, lesson_id: &str) -> u32 {
        self.last_positions.get(lesson_id).copied().unwrap_or(0)
    }

    /// Returns the enrollment as the server is expected to store it after
    /// `update`.
    ///
    /// Completion is sticky: an update with `completed: false` never removes a
    /// lesson from the completed set. Progress is recomputed only when the
    /// lesson total is known.
    pub fn with_progress(&self, update: &ProgressUpdate) -> Enrollment {
        let mut next = self.clone();
        next.last_positions
            .insert(update.lesson_id.clone(), update.position_secs);
        if update.completed {
            next.completed_lesson_ids.insert(update.lesson_id.clone());
        }
        if next.total_lessons > 0 {
            let done = next.completed_lesson_ids.len().min(next.total_lessons as usize);
            // CORRECTNESS: done <= total_lessons, so the ratio is at most 100
            #[allow(clippy::cast_possible_truncation)]
            let pct = (done * 100 / next.total_lessons as usize) as u8;
            next.progress = pct;
            if pct == 100 && next.status == EnrollmentStatus::Active {
                next.status = EnrollmentStatus::Completed;
            }
        }
        next
    }
}

impl Validate for Enrollment {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("courseId", &self.course_id);
        if self.progress > 100 {
            v.push("progress", "must be between 0 and 100");
        }
    }
}

#[cfg(test)]
#[path = "enrollment_tests.rs"]
mod tests;
