// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use lms_core::models::{Assignment, NewSubmission, Submission};

use super::{get_fetcher, keys, optional_fetcher, segment, BoxFetch};
use crate::client::LmsClient;
use crate::error::{Error, Result};

#[derive(Serialize)]
struct GradeRequest<'a> {
    score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback: Option<&'a str>,
}

#[derive(Clone)]
pub struct AssignmentsApi {
    client: LmsClient,
}

impl AssignmentsApi {
    pub(crate) fn new(client: LmsClient) -> Self {
        AssignmentsApi { client }
    }

    pub async fn list(&self, course_id: &str) -> Result<Vec<Assignment>> {
        self.client
            .cache()
            .query(
                keys::assignment_list(course_id),
                self.client.query_options(),
                get_fetcher(
                    self.client.http(),
                    format!("/courses/{}/assignments", segment(course_id)),
                    Vec::new(),
                ),
            )
            .await
    }

    pub async fn detail(&self, assignment_id: &str) -> Result<Assignment> {
        self.client
            .cache()
            .query(
                keys::assignment_detail(assignment_id),
                self.client.query_options(),
                get_fetcher(
                    self.client.http(),
                    format!("/assignments/{}", segment(assignment_id)),
                    Vec::new(),
                ),
            )
            .await
    }

    /// The signed-in user's submission, or `None` before one is made.
    pub async fn submission(&self, assignment_id: &str) -> Result<Option<Submission>> {
        self.client
            .cache()
            .query(
                keys::submission(assignment_id),
                self.client.query_options(),
                self.submission_fetcher(assignment_id),
            )
            .await
    }

    fn submission_fetcher(
        &self,
        assignment_id: &str,
    ) -> impl Fn() -> BoxFetch<Option<Submission>> + Send + Sync + 'static {
        optional_fetcher(
            self.client.http(),
            format!("/assignments/{}/submission", segment(assignment_id)),
        )
    }

    /// Hands in work for an assignment.
    ///
    /// Blank text is rejected before any request. Once a submission exists
    /// further attempts fail with [`Error::AlreadySubmitted`].
    pub async fn submit(&self, assignment_id: &str, submission: &NewSubmission) -> Result<Submission> {
        let result = self.try_submit(assignment_id, submission).await;
        if result.is_ok() {
            self.client.cache().invalidate(&keys::submission(assignment_id));
        }
        self.client.report(result, Some("Assignment submitted"))
    }

    async fn try_submit(&self, assignment_id: &str, submission: &NewSubmission) -> Result<Submission> {
        if submission.text.trim().is_empty() {
            return Err(Error::FieldEmpty { field: "text" });
        }
        // A stale entry may predate our own earlier submit; confirm with the server.
        let existing = self
            .client
            .cache()
            .fetch_query(
                keys::submission(assignment_id),
                self.client.query_options(),
                self.submission_fetcher(assignment_id),
            )
            .await?;
        if existing.is_some() {
            return Err(Error::AlreadySubmitted {
                assignment_id: assignment_id.to_string(),
            });
        }
        self.client
            .http()
            .post(
                &format!("/assignments/{}/submissions", segment(assignment_id)),
                submission,
            )
            .await
    }

    /// Scores a submission (instructors only).
    pub async fn grade(
        &self,
        submission_id: &str,
        score: u32,
        feedback: Option<&str>,
    ) -> Result<Submission> {
        let result: Result<Submission> = self
            .client
            .http()
            .patch(
                &format!("/submissions/{}/grade", segment(submission_id)),
                &GradeRequest { score, feedback },
            )
            .await;
        if let Ok(ref graded) = result {
            self.client
                .cache()
                .invalidate(&keys::submission(&graded.assignment_id));
        }
        self.client.report(result, Some("Grade saved"))
    }
}
