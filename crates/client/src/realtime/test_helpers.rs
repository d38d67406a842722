// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mock transport shared by the realtime tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lms_core::RealtimeEvent;

use super::transport::{EventTransport, TransportError, TransportFuture};

/// What the next `recv` on the mock yields.
pub enum Incoming {
    Event(RealtimeEvent),
    /// Server closed the stream.
    Close,
    /// Stream broke mid-read.
    Fail,
}

/// Mock transport for testing without real sockets.
///
/// Once the scripted frames run out, `recv` idles until more are queued.
/// Clones share their script and counters.
#[derive(Clone, Default)]
pub struct MockTransport {
    connected: Arc<AtomicBool>,
    incoming: Arc<Mutex<VecDeque<Incoming>>>,
    /// Connect attempts that fail before one succeeds.
    failures_left: Arc<AtomicU32>,
    unauthorized: Arc<AtomicBool>,
    connects: Arc<AtomicU32>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, frame: Incoming) {
        self.incoming.lock().unwrap().push_back(frame);
    }

    pub fn queue_event(&self, event: RealtimeEvent) {
        self.queue(Incoming::Event(event));
    }

    pub fn fail_connects(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn reject_unauthorized(&self) {
        self.unauthorized.store(true, Ordering::SeqCst);
    }

    pub fn connect_calls(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn pending_frames(&self) -> usize {
        self.incoming.lock().unwrap().len()
    }
}

impl EventTransport for MockTransport {
    fn connect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.unauthorized.load(Ordering::SeqCst) {
                return Err(TransportError::Unauthorized);
            }
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<RealtimeEvent>> {
        let incoming = Arc::clone(&self.incoming);
        let connected = Arc::clone(&self.connected);
        Box::pin(async move {
            loop {
                let frame = incoming.lock().unwrap().pop_front();
                match frame {
                    Some(Incoming::Event(event)) => return Ok(Some(event)),
                    Some(Incoming::Close) => {
                        connected.store(false, Ordering::SeqCst);
                        return Ok(None);
                    }
                    Some(Incoming::Fail) => {
                        connected.store(false, Ordering::SeqCst);
                        return Err(TransportError::ReceiveFailed("mock break".into()));
                    }
                    None => tokio::time::sleep(Duration::from_millis(5)).await,
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
