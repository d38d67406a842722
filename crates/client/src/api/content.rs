// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lesson media: presigned uploads and playback grants.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use lms_core::models::{PlaybackGrant, Quality, UploadComplete, UploadRequest, UploadTicket};
use lms_core::schema::check_input;

use super::{keys, segment};
use crate::client::LmsClient;
use crate::error::Result;

/// A grant is renewed once it is this close to expiry.
pub const PLAYBACK_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Share of measured bandwidth a rendition may use.
const BANDWIDTH_HEADROOM_PERCENT: u64 = 80;

#[derive(Clone)]
pub struct ContentApi {
    client: LmsClient,
}

impl ContentApi {
    pub(crate) fn new(client: LmsClient) -> Self {
        ContentApi { client }
    }

    /// Uploads lesson media in three steps: request a ticket, PUT the bytes
    /// to storage, confirm with size and checksum.
    pub async fn upload(&self, mut request: UploadRequest, bytes: Vec<u8>) -> Result<UploadTicket> {
        request.size = bytes.len() as u64;
        let result = self.try_upload(&request, bytes).await;
        if result.is_ok() {
            self.client
                .cache()
                .invalidate(&keys::course_detail(&request.course_id));
        }
        self.client.report(result, Some("Upload complete"))
    }

    async fn try_upload(&self, request: &UploadRequest, bytes: Vec<u8>) -> Result<UploadTicket> {
        check_input(request)?;
        let http = self.client.http();

        let ticket: UploadTicket = http.post("/content/uploads", request).await?;
        debug!(upload = %ticket.upload_id, size = request.size, "upload ticket issued");

        let complete = UploadComplete {
            size: request.size,
            sha256: hex::encode(Sha256::digest(&bytes)),
        };
        http.put_presigned(&ticket.upload_url, bytes, &request.content_type)
            .await?;

        http.post::<_, ()>(
            &format!("/content/uploads/{}/complete", segment(&ticket.upload_id)),
            &complete,
        )
        .await?;
        info!(upload = %ticket.upload_id, filename = %request.filename, "upload confirmed");
        Ok(ticket)
    }

    /// Fetches a fresh playback grant. Grants are short-lived and never cached.
    pub async fn playback(&self, lesson_id: &str) -> Result<PlaybackGrant> {
        self.client
            .http()
            .get(
                &format!("/content/lessons/{}/playback", segment(lesson_id)),
                &[],
            )
            .await
    }

    /// Starts a playback session for one lesson.
    pub fn session(&self, lesson_id: impl Into<String>) -> PlaybackSession {
        PlaybackSession {
            api: self.clone(),
            lesson_id: lesson_id.into(),
            grant: None,
            quality_override: None,
        }
    }
}

/// Holds the current grant for a lesson and renews it near expiry.
pub struct PlaybackSession {
    api: ContentApi,
    lesson_id: String,
    grant: Option<PlaybackGrant>,
    quality_override: Option<String>,
}

impl PlaybackSession {
    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    /// Returns a usable grant, fetching a new one when the current grant is
    /// missing or within [`PLAYBACK_REFRESH_MARGIN`] of expiry.
    pub async fn grant(&mut self) -> Result<&PlaybackGrant> {
        if self.needs_refresh() {
            let grant = self.api.playback(&self.lesson_id).await?;
            debug!(lesson = %self.lesson_id, expires_at = %grant.expires_at, "playback grant renewed");
            self.grant = Some(grant);
        }
        match self.grant {
            Some(ref grant) => Ok(grant),
            None => Err(lms_core::Error::Unknown {
                status: None,
                message: "playback grant unavailable".to_string(),
            }
            .into()),
        }
    }

    pub fn needs_refresh(&self) -> bool {
        let Some(ref grant) = self.grant else {
            return true;
        };
        let now = now_utc(self.api.client.clock().now_ms());
        let margin = chrono::Duration::from_std(PLAYBACK_REFRESH_MARGIN)
            .unwrap_or_else(|_| chrono::Duration::zero());
        now + margin >= grant.expires_at
    }

    /// Pins a rendition by label; `None` returns to automatic selection.
    pub fn set_quality_override(&mut self, label: Option<String>) {
        self.quality_override = label;
    }

    /// Picks a rendition from the current grant.
    ///
    /// An override wins when the grant offers it. Otherwise the highest
    /// bitrate within the bandwidth headroom is chosen, falling back to the
    /// lowest bitrate when nothing fits.
    pub fn select_quality(&self, bandwidth_kbps: u32) -> Option<&Quality> {
        let qualities = &self.grant.as_ref()?.qualities;
        select_quality(qualities, self.quality_override.as_deref(), bandwidth_kbps)
    }
}

pub(crate) fn select_quality<'a>(
    qualities: &'a [Quality],
    override_label: Option<&str>,
    bandwidth_kbps: u32,
) -> Option<&'a Quality> {
    if let Some(label) = override_label {
        if let Some(q) = qualities.iter().find(|q| q.label == label) {
            return Some(q);
        }
    }
    let budget = u64::from(bandwidth_kbps) * BANDWIDTH_HEADROOM_PERCENT / 100;
    qualities
        .iter()
        .filter(|q| u64::from(q.bitrate_kbps) <= budget)
        .max_by_key(|q| q.bitrate_kbps)
        .or_else(|| qualities.iter().min_by_key(|q| q.bitrate_kbps))
}

fn now_utc(ms: u64) -> DateTime<Utc> {
    let ms = i64::try_from(ms).unwrap_or(i64::MAX);
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
