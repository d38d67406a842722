// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::schema::{Validate, Violations};

/// Difficulty level advertised on the course card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(Error::validation(format!("invalid level: '{}'", s))),
        }
    }
}

/// How a lesson is rendered by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    Video,
    Document,
    Quiz,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub kind: LessonKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub position: u32,
}

impl Validate for Lesson {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("title", &self.title);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Validate for Module {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("title", &self.title);
        v.each("lessons", &self.lessons);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    /// Zero when the backend omits it.
    #[serde(default)]
    pub price: f64,
    /// Zero when the backend omits it.
    #[serde(default)]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Iterates lessons across all modules in module order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons().find(|l| l.id == lesson_id)
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn is_free(&self) -> bool {
        self.price == 0.0
    }
}

impl Validate for Course {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("title", &self.title);
        v.non_negative("price", self.price);
        v.in_range("rating", self.rating, 0.0, 5.0);
        v.each("modules", &self.modules);
    }
}

/// Body for instructor course creation and updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Level,
}

impl Validate for NewCourse {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("title", &self.title);
        v.non_negative("price", self.price);
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    #[serde(alias = "data")]
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

impl<T: Validate> Validate for Paginated<T> {
    fn validate(&self, v: &mut Violations) {
        if self.page == 0 {
            v.push("page", "must be at least 1");
        }
        if self.limit == 0 {
            v.push("limit", "must be at least 1");
        } else {
            if self.items.len() > self.limit as usize {
                v.push("items", format!("holds more than limit ({})", self.limit));
            }
            let expected = self.total.div_ceil(u64::from(self.limit));
            if self.total_pages != expected {
                v.push(
                    "totalPages",
                    format!("expected {} for total {}", expected, self.total),
                );
            }
        }
        v.each("items", &self.items);
    }
}

/// Query parameters for the course catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilters {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

impl Default for CourseFilters {
    fn default() -> Self {
        CourseFilters {
            page: 1,
            limit: 9,
            search: None,
            category: None,
            level: None,
        }
    }
}

impl CourseFilters {
    pub fn page(page: u32, limit: u32) -> Self {
        CourseFilters {
            page,
            limit,
            ..Self::default()
        }
    }

    /// Query-string pairs, skipping unset and blank filters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                pairs.push(("search".to_string(), search.to_string()));
            }
        }
        if let Some(ref category) = self.category {
            pairs.push(("category".to_string(), category.clone()));
        }
        if let Some(level) = self.level {
            pairs.push(("level".to_string(), level.as_str().to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[path = "course_tests.rs"]
mod tests;
