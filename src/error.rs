// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types shared by the session, cache and reader layers.

use reqwest::StatusCode;

/// Application error type surfaced to the UI layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A 401 that survived the refresh-and-retry path.
    #[error("Session expired, please log in again")]
    Unauthorized,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Current user has no {0} scope")]
    MissingScope(&'static str),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors that mean the user has to log in again.
    pub fn is_auth_error(&self) -> bool {
        match self {
            AppError::Unauthorized | AppError::NotAuthenticated => true,
            AppError::Api { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if it came from the API.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
