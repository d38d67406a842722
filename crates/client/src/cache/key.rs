// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Array-valued cache keys.
//!
//! A key is the resource name followed by its parameters. Each part is
//! canonicalized to a string (objects serialize with sorted keys), so two
//! keys built from equal parameters compare equal. Invalidation matches by
//! prefix: `["courses"]` covers `["courses","list",{...}]` and
//! `["courses","detail","c1"]`.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    parts: Vec<String>,
}

impl QueryKey {
    /// Starts a key with the resource name.
    pub fn new(resource: &str) -> Self {
        QueryKey {
            parts: vec![resource.to_string()],
        }
    }

    /// Appends a plain string segment.
    pub fn with(mut self, part: impl fmt::Display) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Appends a serializable parameter in canonical JSON form.
    ///
    /// Unserializable values collapse to `null`, which still yields a stable
    /// key.
    pub fn param<T: Serialize>(mut self, value: &T) -> Self {
        let canonical = serde_json::to_value(value)
            .map(|v| canonical_json(&v))
            .unwrap_or_else(|_| "null".to_string());
        self.parts.push(canonical);
        self
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn resource(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }

    /// Returns true if `prefix` is a leading run of this key's parts.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.parts.starts_with(&prefix.parts)
    }
}

/// Renders JSON with object keys sorted, independent of map ordering.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        serde_json::Value::String(k.clone()),
                        canonical_json(v)
                    )
                })
                .collect();
            format!("{{{}}}", body.join(","))
        }
        serde_json::Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        other => other.to_string(),
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.parts.join(", "))
    }
}

impl From<&str> for QueryKey {
    fn from(resource: &str) -> Self {
        QueryKey::new(resource)
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
