// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! lms-client - Data-sync SDK for the LMS backend.
//!
//! Screens read through a query cache, write through the per-resource APIs,
//! and receive notifications over a realtime SSE bridge.
//!
//! # Main Components
//!
//! - [`LmsClient`] - Facade holding the session, cache and notifier
//! - [`HttpClient`] - Bearer-token REST adapter with error normalization
//! - [`cache`] - Keyed query cache with stale-while-revalidate and optimistic updates
//! - [`realtime`] - SSE notification bridge with reconnect and polling fallback
//! - [`ViewState`] - Loading / error / empty / populated screen state
//!
//! # Usage
//!
//! ```rust,ignore
//! use lms_client::{ClientConfig, LmsClient, ViewState};
//! use lms_core::models::CourseFilters;
//!
//! let client = LmsClient::new(ClientConfig::new("https://lms.example.com/api")?)?;
//! client.auth().login("ada@example.com", "secret").await?;
//!
//! let view = ViewState::from(client.courses().list(&CourseFilters::page(1, 20)).await);
//! ```

pub mod api;
pub mod cache;
mod client;
pub mod config;
mod error;
pub mod http;
pub mod logging;
mod notify;
pub mod realtime;
pub mod token;
mod view;

pub use client::{BackgroundTasks, LmsClient, LmsClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::HttpClient;
pub use notify::{ChannelNotifier, Notifier, Toast, ToastLevel, TracingNotifier};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use view::{Emptiness, ViewState};
