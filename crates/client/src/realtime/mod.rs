// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime notification bridge.
//!
//! A long-lived SSE subscription pushes new notifications straight into the
//! cache. While it is down, notification reads fall back to polling.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

mod bridge;
mod poller;
mod transport;

#[cfg(test)]
mod test_helpers;

pub use bridge::{ingest_event, NotificationBridge};
pub use poller::spawn_fallback_poller;
pub use transport::{EventTransport, SseTransport, TransportError, TransportFuture, TransportResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionStatus {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionStatus::Connecting,
            2 => ConnectionStatus::Connected,
            _ => ConnectionStatus::Disconnected,
        }
    }
}

/// Connection state shared between the bridge task and readers.
///
/// Uses atomic fields for lock-free reads.
#[derive(Debug)]
pub struct SharedConnectionStatus {
    state: AtomicU8,
    attempt: AtomicU32,
}

impl SharedConnectionStatus {
    pub fn new() -> Self {
        SharedConnectionStatus {
            state: AtomicU8::new(ConnectionStatus::Disconnected as u8),
            attempt: AtomicU32::new(0),
        }
    }

    pub fn get(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set(&self, status: ConnectionStatus) {
        self.state.store(status as u8, Ordering::Release);
    }

    /// Current connection attempt (0 once connected).
    pub fn attempt(&self) -> u32 {
        self.attempt.load(Ordering::Acquire)
    }

    pub fn set_attempt(&self, attempt: u32) {
        self.attempt.store(attempt, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionStatus::Connected
    }

    pub fn status_string(&self) -> String {
        match self.get() {
            ConnectionStatus::Connecting if self.attempt() > 1 => {
                format!("connecting (attempt {})", self.attempt())
            }
            status => status.as_str().to_string(),
        }
    }
}

impl Default for SharedConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
