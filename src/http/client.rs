// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garage API client.
//!
//! Handles:
//! - Bearer token attachment from the [`TokenStore`]
//! - One token refresh and one retry when a request gets a 401
//! - Mapping of non-2xx responses to [`AppError`]

use crate::error::{AppError, Result};
use crate::models::{AuthResponse, LoginCredentials};
use crate::session::TokenStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Build an API path from raw segments, percent-encoding each one.
pub fn api_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| format!("/{}", urlencoding::encode(s)))
        .collect()
}

/// A request that can be re-issued after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    /// Set once the request has been re-sent after a refresh.
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to encode request body: {}", e))
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Single configured request pipeline for the garage API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    /// Serializes refreshes so concurrent 401s don't each spend the refresh token.
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<TokenStore>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    // ─── Typed helpers ──────────────────────────────────────────────────────

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(ApiRequest::new(Method::POST, path).with_json(body)?)
            .await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(ApiRequest::new(Method::PATCH, path).with_json(body)?)
            .await
    }

    /// PATCH without a body.
    pub async fn patch(&self, path: &str) -> Result<Value> {
        self.send(ApiRequest::new(Method::PATCH, path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    // ─── Pipeline ───────────────────────────────────────────────────────────

    /// Send a request through the pipeline.
    ///
    /// A 401 on the first attempt triggers exactly one refresh and one
    /// retry. A 401 on the retry is final.
    pub async fn send(&self, mut request: ApiRequest) -> Result<Value> {
        let sent_with = self.tokens.access_token();
        let response = self.dispatch(&request, sent_with.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.retried {
            return self.finish(response).await;
        }

        request.retried = true;
        tracing::info!(path = %request.path, "Access token rejected, refreshing");

        let token = match self.refreshed_token(sent_with.as_deref()).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Token refresh failed");
                return Err(AppError::Unauthorized);
            }
        };

        let response = self.dispatch(&request, Some(&token)).await?;
        self.finish(response).await
    }

    /// Refresh unless another request already replaced the rejected token.
    async fn refreshed_token(&self, rejected: Option<&str>) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.tokens.access_token() {
            if Some(current.as_str()) != rejected {
                tracing::debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        Ok(self.refresh().await?.access_token)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| {
            tracing::warn!(method = %request.method, path = %request.path, error = %e, "Request failed");
            AppError::Network(e.to_string())
        })
    }

    async fn finish(&self, response: reqwest::Response) -> Result<Value> {
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized);
        }
        read_json_body(response).await
    }

    // ─── Auth endpoints (outside the bearer pipeline) ───────────────────────

    /// `POST /auth/login`. Does not touch the token store.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(credentials)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Login request failed: {}", e)))?;

        let body = read_json_body(response).await?;
        serde_json::from_value(body)
            .map_err(|e| AppError::InvalidResponse(format!("bad login response: {}", e)))
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// Stores the new session on success; clears it on any failure.
    pub async fn refresh(&self) -> Result<AuthResponse> {
        match self.try_refresh().await {
            Ok(auth) => {
                self.tokens.set_session(&auth)?;
                tracing::info!("Access token refreshed");
                Ok(auth)
            }
            Err(e) => {
                self.tokens.clear_session();
                Err(e)
            }
        }
    }

    async fn try_refresh(&self) -> Result<AuthResponse> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .ok_or(AppError::NotAuthenticated)?;

        let response = self
            .http
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Token refresh request failed: {}", e)))?;

        let body = read_json_body(response).await?;
        serde_json::from_value(body)
            .map_err(|e| AppError::InvalidResponse(format!("bad refresh response: {}", e)))
    }
}

/// Check response status and parse the JSON body (empty bodies become `null`).
async fn read_json_body(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::Network(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        let message = error_message(&text).unwrap_or_else(|| status.to_string());
        tracing::debug!(status = %status, message = %message, "API returned an error");
        return Err(AppError::Api { status, message });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| AppError::InvalidResponse(format!("JSON parse error: {}", e)))
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("message")
            .or_else(|| json.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Err(_) => Some(body.trim().to_string()),
    }
}
