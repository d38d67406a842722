// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::schema::{Validate, Violations};

/// Account role, which gates instructor-only writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn is_instructor(&self) -> bool {
        matches!(self.role, Role::Instructor | Role::Admin)
    }
}

impl Validate for User {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        if !self.email.contains('@') {
            v.push("email", "must be an email address");
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response to a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl Validate for AuthSession {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("token", &self.token);
        v.nested("user", &self.user);
    }
}
