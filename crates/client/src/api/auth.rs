// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tracing::info;

use lms_core::models::{AuthSession, Credentials, User};

use super::{get_fetcher, keys};
use crate::client::LmsClient;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct AuthApi {
    client: LmsClient,
}

impl AuthApi {
    pub(crate) fn new(client: LmsClient) -> Self {
        AuthApi { client }
    }

    /// Signs in and stores the session token.
    ///
    /// Anything cached for a previous session is dropped.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let result = self.try_login(email, password).await;
        self.client.report(result, None)
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<User> {
        if email.trim().is_empty() {
            return Err(Error::FieldEmpty { field: "email" });
        }
        if password.is_empty() {
            return Err(Error::FieldEmpty { field: "password" });
        }
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let session: AuthSession = self.client.http().post("/auth/login", &credentials).await?;

        self.client.http().tokens().set(&session.token)?;
        self.client.cache().clear();
        info!(user = %session.user.id, "signed in");
        Ok(session.user)
    }

    /// Forgets the session token and everything cached under it.
    pub fn logout(&self) -> Result<()> {
        self.client.http().tokens().clear()?;
        self.client.cache().clear();
        info!("signed out");
        Ok(())
    }

    /// The signed-in user.
    pub async fn me(&self) -> Result<User> {
        self.client
            .cache()
            .query(
                keys::me(),
                self.client.query_options(),
                get_fetcher(self.client.http(), "/auth/me".to_string(), Vec::new()),
            )
            .await
    }
}
