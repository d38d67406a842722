// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP adapter for the REST backend.
//!
//! Every request picks up the bearer token from the [`TokenStore`]. Every
//! response passes through the normalizer, which maps transport failures and
//! non-success statuses into the closed [`lms_core::Error`] taxonomy and
//! validates success bodies before they are returned. A `401` clears the
//! stored token as a side effect. No retries happen at this layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use lms_core::{FieldError, Validate};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::token::TokenStore;

/// Query-string pairs.
pub type Query = [(String, String)];

/// Authenticated, normalizing HTTP client.
pub struct HttpClient {
    client: reqwest::Client,
    /// Same stack without the request timeout, for long-lived streams.
    stream_client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    /// Builds a client for `config.base_url`.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        if let Some(msg) = config.validate_url() {
            return Err(Error::Config(msg));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(HttpClient {
            client,
            stream_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Resolves a backend path against the base URL, keeping the base path.
    pub fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
    }

    pub async fn get<T>(&self, path: &str, query: &Query) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        self.send(Method::GET, path, query, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        self.send(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        self.send(Method::DELETE, path, &[], None::<&()>).await
    }

    /// Sends one request and returns the validated body.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        let url = self.url(path)?;
        debug!(%method, %url, "request");

        let mut request = self.client.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request = self.authorize(request)?;

        let response = request.send().await.map_err(|e| {
            let err = normalize_transport(&e);
            warn!(%method, %url, kind = %err.kind(), "request failed: {}", e);
            err
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| normalize_transport(&e))?;

        if !status.is_success() {
            let err = normalize_status(status.as_u16(), &bytes);
            warn!(%method, %url, status = status.as_u16(), kind = %err.kind(), "request rejected");
            if status == StatusCode::UNAUTHORIZED {
                self.clear_session();
            }
            return Err(err.into());
        }

        let value = lms_core::decode::<T>(&bytes).map_err(|e| {
            warn!(%method, %url, "response failed validation: {}", e);
            e
        })?;
        Ok(value)
    }

    /// Uploads raw bytes to a presigned object-storage URL.
    ///
    /// The URL already carries its own authorization, so no bearer token is
    /// sent to the storage host.
    pub async fn put_presigned(&self, url: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let url = Url::parse(url)?;
        debug!(host = url.host_str().unwrap_or(""), size = bytes.len(), "presigned upload");
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| normalize_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            // A storage 401/403 means the presigned URL expired; the session is fine.
            return Err(normalize_status(status.as_u16(), &body).into());
        }
        Ok(())
    }

    /// Opens a long-lived GET, used by the realtime stream.
    ///
    /// Status handling matches [`send`](Self::send) including the `401`
    /// token clear; the streaming body is returned untouched.
    pub async fn open_stream(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path)?;
        let request = self
            .stream_client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let request = self.authorize(request)?;

        let response = request.send().await.map_err(|e| normalize_transport(&e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                self.clear_session();
            }
            return Err(normalize_status(status.as_u16(), &body).into());
        }
        Ok(response)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        Ok(match self.tokens.get()? {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        })
    }

    fn clear_session(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!("failed to clear token after 401: {}", e);
        } else {
            debug!("cleared session token after 401");
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<ErrorDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetails {
    List(Vec<FieldError>),
    Map(BTreeMap<String, FieldMessages>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl ErrorDetails {
    fn into_fields(self) -> Vec<FieldError> {
        match self {
            ErrorDetails::List(fields) => fields,
            ErrorDetails::Map(map) => map
                .into_iter()
                .flat_map(|(field, messages)| {
                    let messages = match messages {
                        FieldMessages::One(m) => vec![m],
                        FieldMessages::Many(ms) => ms,
                    };
                    messages
                        .into_iter()
                        .map(move |m| FieldError::new(field.clone(), m))
                })
                .collect(),
        }
    }
}

/// Maps a non-success status and its body into the closed taxonomy.
pub fn normalize_status(status: u16, body: &[u8]) -> lms_core::Error {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        401 => lms_core::Error::Unauthorized,
        403 => lms_core::Error::Forbidden(message),
        400 | 422 => lms_core::Error::Validation {
            message,
            fields: parsed.errors.map(ErrorDetails::into_fields).unwrap_or_default(),
        },
        500..=599 => lms_core::Error::Server { status, message },
        _ => lms_core::Error::Unknown {
            status: Some(status),
            message,
        },
    }
}

/// Maps a reqwest failure (no usable status) into the closed taxonomy.
pub fn normalize_transport(e: &reqwest::Error) -> lms_core::Error {
    if e.is_builder() {
        lms_core::Error::unknown(e.to_string())
    } else if e.is_decode() {
        lms_core::Error::validation(e.to_string())
    } else {
        lms_core::Error::Network(e.to_string())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
