// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use lms_core::models::{Course, CourseFilters, Lesson, NewCourse, Paginated};
use lms_core::schema::check_input;

use super::{get_fetcher, keys, segment};
use crate::client::LmsClient;
use crate::error::Result;

/// The catalogue changes rarely; listings stay fresh for five minutes.
const LIST_STALE_TIME: Duration = Duration::from_secs(5 * 60);

#[derive(Clone)]
pub struct CoursesApi {
    client: LmsClient,
}

impl CoursesApi {
    pub(crate) fn new(client: LmsClient) -> Self {
        CoursesApi { client }
    }

    /// One page of the catalogue.
    pub async fn list(&self, filters: &CourseFilters) -> Result<Paginated<Course>> {
        let mut options = self.client.query_options();
        options.stale_time = LIST_STALE_TIME;
        self.client
            .cache()
            .query(
                keys::course_list(filters),
                options,
                get_fetcher(self.client.http(), "/courses".to_string(), filters.to_query()),
            )
            .await
    }

    pub async fn detail(&self, course_id: &str) -> Result<Course> {
        self.client
            .cache()
            .query(
                keys::course_detail(course_id),
                self.client.query_options(),
                get_fetcher(
                    self.client.http(),
                    format!("/courses/{}", segment(course_id)),
                    Vec::new(),
                ),
            )
            .await
    }

    pub async fn lesson(&self, course_id: &str, lesson_id: &str) -> Result<Lesson> {
        self.client
            .cache()
            .query(
                keys::lesson(course_id, lesson_id),
                self.client.query_options(),
                get_fetcher(
                    self.client.http(),
                    format!("/courses/{}/lessons/{}", segment(course_id), segment(lesson_id)),
                    Vec::new(),
                ),
            )
            .await
    }

    pub async fn create(&self, course: &NewCourse) -> Result<Course> {
        let result = match check_input(course) {
            Ok(()) => self.client.http().post("/courses", course).await,
            Err(e) => Err(e.into()),
        };
        if result.is_ok() {
            self.client.cache().invalidate(&keys::courses());
        }
        self.client.report(result, Some("Course created"))
    }

    /// Replaces a course; the cached detail is updated in place.
    pub async fn update(&self, course_id: &str, course: &NewCourse) -> Result<Course> {
        let result: Result<Course> = match check_input(course) {
            Ok(()) => {
                self.client
                    .http()
                    .put(&format!("/courses/{}", segment(course_id)), course)
                    .await
            }
            Err(e) => Err(e.into()),
        };
        if let Ok(ref updated) = result {
            let cache = self.client.cache();
            cache.set_query_data(&keys::course_detail(course_id), updated.clone());
            cache.invalidate(&keys::courses());
        }
        self.client.report(result, Some("Course updated"))
    }

    pub async fn delete(&self, course_id: &str) -> Result<()> {
        let result: Result<()> = self
            .client
            .http()
            .delete(&format!("/courses/{}", segment(course_id)))
            .await;
        if result.is_ok() {
            let cache = self.client.cache();
            cache.remove(&keys::course_detail(course_id));
            cache.invalidate(&keys::courses());
            cache.invalidate(&keys::enrollments());
        }
        self.client.report(result, Some("Course deleted"))
    }
}
