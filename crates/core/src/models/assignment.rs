// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Validate, Violations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
}

fn default_max_score() -> u32 {
    100
}

impl Assignment {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_at.is_some_and(|due| now > due)
    }
}

impl Validate for Assignment {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("courseId", &self.course_id);
        v.non_empty("title", &self.title);
        if self.max_score == 0 {
            v.push("maxScore", "must be at least 1");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
    Returned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Validate for Submission {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("assignmentId", &self.assignment_id);
        if self.status == SubmissionStatus::Graded && self.score.is_none() {
            v.push("score", "graded submissions must carry a score");
        }
    }
}

/// Body of an assignment submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl NewSubmission {
    pub fn text(text: impl Into<String>) -> Self {
        NewSubmission {
            text: text.into(),
            attachments: Vec::new(),
        }
    }
}

impl Validate for NewSubmission {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("text", &self.text);
    }
}
