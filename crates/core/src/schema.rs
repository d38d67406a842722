// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Response schema validation.
//!
//! Decoding happens in two passes: `serde` enforces the structural shape and
//! fills declared defaults, then [`Validate`] checks the value rules that
//! types alone cannot express (non-empty ids, ranges, pagination arithmetic).
//! Anything that fails either pass becomes [`Error::Validation`] so malformed
//! responses never reach the cache.

use serde::de::DeserializeOwned;

use crate::error::{Error, FieldError, Result};

/// Value-level checks applied after deserialization.
pub trait Validate {
    /// Records every violation found in `self` into `v`.
    fn validate(&self, v: &mut Violations);
}

/// Collector for field violations with a nested path prefix.
#[derive(Debug, Default)]
pub struct Violations {
    path: Vec<String>,
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation on `field` relative to the current path.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        let full = self.qualify(field);
        self.errors.push(FieldError::new(full, message));
    }

    /// Validates `child` with `segment` appended to the path.
    pub fn nested<T: Validate + ?Sized>(&mut self, segment: &str, child: &T) {
        self.path.push(segment.to_string());
        child.validate(self);
        self.path.pop();
    }

    /// Validates each element under `field[i]`.
    pub fn each<T: Validate>(&mut self, field: &str, items: &[T]) {
        for (i, item) in items.iter().enumerate() {
            self.nested(&format!("{}[{}]", field, i), item);
        }
    }

    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        }
    }

    pub fn in_range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !(min..=max).contains(&value) {
            self.push(field, format!("must be between {} and {}", min, max));
        }
    }

    pub fn non_negative(&mut self, field: &str, value: f64) {
        if value < 0.0 || value.is_nan() {
            self.push(field, "must not be negative");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    fn qualify(&self, field: &str) -> String {
        if self.path.is_empty() {
            return field.to_string();
        }
        let prefix = self.path.join(".");
        if field.is_empty() {
            prefix
        } else {
            format!("{}.{}", prefix, field)
        }
    }
}

/// Runs [`Validate`] on an already-decoded value.
pub fn check<T: Validate + ?Sized>(value: &T) -> Result<()> {
    check_with(value, "response failed schema validation")
}

/// Runs [`Validate`] on outgoing input before it is sent.
pub fn check_input<T: Validate + ?Sized>(value: &T) -> Result<()> {
    check_with(value, "invalid input")
}

fn check_with<T: Validate + ?Sized>(value: &T, message: &str) -> Result<()> {
    let mut v = Violations::new();
    value.validate(&mut v);
    if v.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation {
            message: message.to_string(),
            fields: v.into_errors(),
        })
    }
}

/// Decodes a JSON body and validates it.
///
/// An empty body decodes as JSON `null`, which lets `()` and `Option<T>`
/// represent `204 No Content` responses.
pub fn decode<T: DeserializeOwned + Validate>(bytes: &[u8]) -> Result<T> {
    let value: T = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)?
    } else {
        serde_json::from_slice(bytes)?
    };
    check(&value)?;
    Ok(value)
}

/// Decodes an already-parsed JSON value and validates it.
pub fn decode_value<T: DeserializeOwned + Validate>(value: serde_json::Value) -> Result<T> {
    let value: T = serde_json::from_value(value)?;
    check(&value)?;
    Ok(value)
}

impl Validate for () {
    fn validate(&self, _v: &mut Violations) {}
}

impl Validate for u64 {
    fn validate(&self, _v: &mut Violations) {}
}

impl Validate for serde_json::Value {
    fn validate(&self, _v: &mut Violations) {}
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self, v: &mut Violations) {
        for (i, item) in self.iter().enumerate() {
            v.nested(&format!("[{}]", i), item);
        }
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, v: &mut Violations) {
        if let Some(inner) = self {
            inner.validate(v);
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
