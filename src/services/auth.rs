// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, refresh and logout.

use crate::error::{AppError, Result};
use crate::http::ApiClient;
use crate::models::{AuthResponse, LoginCredentials, User};
use crate::session::TokenStore;
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn tokens(&self) -> &Arc<TokenStore> {
        self.api.tokens()
    }

    /// Log in and store the session.
    ///
    /// Any failure leaves the client logged out.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let credentials = LoginCredentials::new(email.trim(), password);
        credentials.validate()?;

        match self.start_session(&credentials).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, company_id = %user.company_id, "Logged in");
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(email = %credentials.email, error = %e, "Login failed");
                self.tokens().clear_session();
                Err(e)
            }
        }
    }

    async fn start_session(&self, credentials: &LoginCredentials) -> Result<User> {
        let auth = self.api.login(credentials).await?;
        let user = auth
            .user
            .clone()
            .ok_or_else(|| AppError::InvalidResponse("login response has no user".into()))?;
        self.tokens().set_session(&auth)?;
        Ok(user)
    }

    pub async fn refresh(&self) -> Result<AuthResponse> {
        self.api.refresh().await
    }

    pub fn logout(&self) {
        tracing::info!("Logging out");
        self.tokens().clear_session();
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.tokens().get_user()
    }
}
