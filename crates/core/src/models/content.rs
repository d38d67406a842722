// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Validate, Violations};

/// Step one of an upload: ask the backend for a presigned URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

impl Validate for UploadRequest {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("courseId", &self.course_id);
        v.non_empty("filename", &self.filename);
        v.non_empty("contentType", &self.content_type);
        if self.size == 0 {
            v.push("size", "must not be empty");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub upload_id: String,
    pub upload_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Validate for UploadTicket {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("uploadId", &self.upload_id);
        if url::Url::parse(&self.upload_url).is_err() {
            v.push("uploadUrl", "must be an absolute URL");
        }
    }
}

/// Step three of an upload: tell the backend the object landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadComplete {
    pub size: u64,
    /// Hex-encoded SHA-256 of the uploaded bytes.
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Validate for ContentItem {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("filename", &self.filename);
    }
}

/// A rendition the player can switch between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    /// Display label, e.g. `720p`.
    pub label: String,
    pub height: u32,
    pub bitrate_kbps: u32,
}

/// Short-lived credentials for streaming a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlaybackGrant {
    pub url: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub qualities: Vec<Quality>,
}

impl Validate for PlaybackGrant {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("url", &self.url);
        v.non_empty("token", &self.token);
        for (i, q) in self.qualities.iter().enumerate() {
            if q.bitrate_kbps == 0 {
                v.push(&format!("qualities[{}].bitrateKbps", i), "must be positive");
            }
        }
    }
}
