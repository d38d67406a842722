// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the realtime stream.
//!
//! Provides a trait-based transport layer that enables:
//! - SSE over HTTP for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use lms_core::{ErrorKind, RealtimeEvent};

use crate::http::HttpClient;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server refused the session; reconnecting will not help.
    #[error("stream rejected: unauthorized")]
    Unauthorized,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A source of realtime events.
pub trait EventTransport: Send {
    fn connect(&mut self) -> TransportFuture<'_, ()>;

    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Receives the next event.
    ///
    /// Returns `None` when the server ended the stream.
    fn recv(&mut self) -> TransportFuture<'_, Option<RealtimeEvent>>;

    fn is_connected(&self) -> bool;
}

type SseStream =
    Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<reqwest::Error>>> + Send>>;

/// Server-sent events over the authenticated HTTP client.
pub struct SseTransport {
    http: Arc<HttpClient>,
    path: String,
    stream: Option<SseStream>,
}

impl SseTransport {
    pub fn new(http: Arc<HttpClient>, path: impl Into<String>) -> Self {
        SseTransport {
            http,
            path: path.into(),
            stream: None,
        }
    }
}

impl EventTransport for SseTransport {
    fn connect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let response = self.http.open_stream(&self.path).await.map_err(|e| {
                if e.kind() == ErrorKind::Unauthorized {
                    TransportError::Unauthorized
                } else {
                    TransportError::ConnectionFailed(e.to_string())
                }
            })?;
            self.stream = Some(Box::pin(response.bytes_stream().eventsource()));
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.stream = None;
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<RealtimeEvent>> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match stream.next().await {
                    Some(Ok(event)) => match RealtimeEvent::from_sse(&event.event, &event.data) {
                        Ok(parsed) => return Ok(Some(parsed)),
                        Err(e) => {
                            warn!(event = %event.event, "dropping malformed event: {}", e);
                            continue;
                        }
                    },
                    Some(Err(e)) => {
                        self.stream = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        debug!("event stream ended");
                        self.stream = None;
                        return Ok(None);
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
