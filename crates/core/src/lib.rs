// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! lms-core: Shared types for the LMS client
//!
//! This crate provides the backend entities, the closed error taxonomy,
//! response schema validation, the realtime event protocol and deep-link
//! remapping used by `lms-client`.

pub mod clock;
pub mod deeplink;
pub mod error;
pub mod event;
pub mod models;
pub mod schema;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, ErrorKind, FieldError, Result};
pub use event::RealtimeEvent;
pub use schema::{decode, decode_value, Validate, Violations};
