// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use tracing::info;

use lms_core::models::{Payment, PaymentIntent, PaymentStatus};

use super::{get_fetcher, keys, segment};
use crate::client::LmsClient;
use crate::error::{Error, Result};
use crate::notify::Toast;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntentRequest<'a> {
    course_id: &'a str,
}

#[derive(Clone)]
pub struct PaymentsApi {
    client: LmsClient,
}

impl PaymentsApi {
    pub(crate) fn new(client: LmsClient) -> Self {
        PaymentsApi { client }
    }

    /// Opens a payment intent for a paid course.
    pub async fn create_intent(&self, course_id: &str) -> Result<PaymentIntent> {
        if course_id.trim().is_empty() {
            return self
                .client
                .report(Err(Error::FieldEmpty { field: "courseId" }), None);
        }
        let result = self
            .client
            .http()
            .post("/payments/intents", &IntentRequest { course_id })
            .await;
        self.client.report(result, None)
    }

    /// Confirms an intent after the payment sheet completes.
    ///
    /// A confirmed purchase grants an enrollment, so payment history and
    /// enrollments are both invalidated once the server answers.
    pub async fn confirm(&self, intent_id: &str) -> Result<Payment> {
        let result: Result<Payment> = self
            .client
            .http()
            .post(
                &format!("/payments/intents/{}/confirm", segment(intent_id)),
                &serde_json::json!({}),
            )
            .await;
        let payment = match result {
            Ok(payment) => payment,
            Err(e) => return self.client.report(Err(e), None),
        };

        let cache = self.client.cache();
        cache.invalidate(&keys::payments());
        cache.invalidate(&keys::enrollments());
        info!(payment = %payment.id, course = %payment.course_id, status = ?payment.status, "payment confirmed");

        match payment.status {
            PaymentStatus::Succeeded => self.client.toast(Toast::success("Payment successful")),
            PaymentStatus::Pending => self.client.toast(Toast::info("Payment processing")),
            PaymentStatus::Failed | PaymentStatus::Refunded => {
                self.client.toast(Toast::error("Payment failed"))
            }
        }
        Ok(payment)
    }

    pub async fn history(&self) -> Result<Vec<Payment>> {
        self.client
            .cache()
            .query(
                keys::payment_history(),
                self.client.query_options(),
                get_fetcher(self.client.http(), "/payments".to_string(), Vec::new()),
            )
            .await
    }
}
