// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use tracing::debug;

use lms_core::models::{Enrollment, ProgressUpdate};

use super::{get_fetcher, keys, optional_fetcher, segment};
use crate::cache::OptimisticUpdate;
use crate::client::LmsClient;
use crate::error::{Error, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollRequest<'a> {
    course_id: &'a str,
}

#[derive(Clone)]
pub struct EnrollmentsApi {
    client: LmsClient,
}

impl EnrollmentsApi {
    pub(crate) fn new(client: LmsClient) -> Self {
        EnrollmentsApi { client }
    }

    /// The signed-in user's enrollments.
    pub async fn list(&self) -> Result<Vec<Enrollment>> {
        self.client
            .cache()
            .query(
                keys::enrollment_list(),
                self.client.query_options(),
                get_fetcher(self.client.http(), "/enrollments".to_string(), Vec::new()),
            )
            .await
    }

    /// The enrollment in one course, or `None` when not enrolled.
    pub async fn for_course(&self, course_id: &str) -> Result<Option<Enrollment>> {
        self.client
            .cache()
            .query(
                keys::enrollment_for_course(course_id),
                self.client.query_options(),
                optional_fetcher(
                    self.client.http(),
                    format!("/enrollments/course/{}", segment(course_id)),
                ),
            )
            .await
    }

    pub async fn enroll(&self, course_id: &str) -> Result<Enrollment> {
        if course_id.trim().is_empty() {
            return self
                .client
                .report(Err(Error::FieldEmpty { field: "courseId" }), None);
        }
        let result: Result<Enrollment> = self
            .client
            .http()
            .post("/enrollments", &EnrollRequest { course_id })
            .await;
        if result.is_ok() {
            let cache = self.client.cache();
            cache.invalidate(&keys::enrollments());
            cache.invalidate(&keys::course_detail(course_id));
        }
        self.client.report(result, Some("Enrolled in course"))
    }

    /// Records lesson progress optimistically.
    ///
    /// The cached enrollment (per-course and in the list) shows the new
    /// position, completion and percentage at once. A rejected update rolls
    /// both back and raises an error toast.
    pub async fn update_progress(
        &self,
        enrollment: &Enrollment,
        update: &ProgressUpdate,
    ) -> Result<Enrollment> {
        let course_key = keys::enrollment_for_course(&enrollment.course_id);
        let list_key = keys::enrollment_list();
        let optimistic =
            OptimisticUpdate::begin(self.client.cache(), [course_key.clone(), list_key.clone()]);

        optimistic.apply(&course_key, |cached: &Option<Enrollment>| {
            cached.as_ref().map(|e| e.with_progress(update))
        });
        optimistic.apply(&list_key, |list: &Vec<Enrollment>| {
            list.iter()
                .map(|e| {
                    if e.id == enrollment.id {
                        e.with_progress(update)
                    } else {
                        e.clone()
                    }
                })
                .collect::<Vec<_>>()
        });
        debug!(enrollment = %enrollment.id, lesson = %update.lesson_id, "progress applied");

        let result = self
            .client
            .http()
            .patch(
                &format!("/enrollments/{}/progress", segment(&enrollment.id)),
                update,
            )
            .await;
        let result = optimistic.settle(result);
        self.client.report(result, None)
    }

    pub async fn drop_course(&self, enrollment_id: &str) -> Result<()> {
        let result: Result<()> = self
            .client
            .http()
            .delete(&format!("/enrollments/{}", segment(enrollment_id)))
            .await;
        if result.is_ok() {
            self.client.cache().invalidate(&keys::enrollments());
        }
        self.client.report(result, Some("Course dropped"))
    }
}
