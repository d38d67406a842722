// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime protocol for the notification stream.
//!
//! The server pushes server-sent events on `/notifications/stream`. Each SSE
//! frame carries an event name and a JSON data payload:
//! - `notification`: a new [`Notification`]
//! - `unread-count`: the authoritative unread total
//! - `ping`: keepalive with no payload
//!
//! Frames with an unrecognized name decode as [`RealtimeEvent::Unknown`] and
//! are ignored by consumers.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Notification, UnreadCount};
use crate::schema;

/// Events pushed by the server over the realtime channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RealtimeEvent {
    /// A notification was created for the current user.
    Notification { notification: Notification },

    /// The unread total changed.
    UnreadCount { count: u64 },

    /// Keepalive.
    Ping,

    /// Any event this client does not understand.
    #[serde(other)]
    Unknown,
}

impl RealtimeEvent {
    /// Event name used for frames without an explicit `event:` field.
    pub const DEFAULT_EVENT: &'static str = "message";

    /// Creates a Notification event.
    pub fn notification(notification: Notification) -> Self {
        RealtimeEvent::Notification { notification }
    }

    /// Decodes one SSE frame.
    ///
    /// The payload is validated the same way as REST responses. Unknown event
    /// names never fail. A `message` frame is decoded as a tagged JSON object
    /// so servers that multiplex on the default event still work.
    pub fn from_sse(event: &str, data: &str) -> Result<Self> {
        match event {
            "notification" => {
                let notification: Notification = schema::decode(data.as_bytes())?;
                Ok(RealtimeEvent::Notification { notification })
            }
            "unread-count" => {
                let unread: UnreadCount = schema::decode(data.as_bytes())?;
                Ok(RealtimeEvent::UnreadCount {
                    count: unread.count,
                })
            }
            "ping" => Ok(RealtimeEvent::Ping),
            "" | Self::DEFAULT_EVENT => Self::from_json(data),
            _ => Ok(RealtimeEvent::Unknown),
        }
    }

    /// Deserializes a tagged JSON event.
    pub fn from_json(s: &str) -> Result<Self> {
        let event: RealtimeEvent = serde_json::from_str(s)?;
        if let RealtimeEvent::Notification { ref notification } = event {
            schema::check(notification)?;
        }
        Ok(event)
    }

    /// Serializes the event to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
