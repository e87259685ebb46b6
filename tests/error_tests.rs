// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use garage_desk::error::AppError;
use reqwest::StatusCode;

#[test]
fn test_is_auth_error_matches() {
    assert!(AppError::Unauthorized.is_auth_error());
    assert!(AppError::NotAuthenticated.is_auth_error());

    let err = AppError::Api {
        status: StatusCode::UNAUTHORIZED,
        message: "Invalid credentials".to_string(),
    };
    assert!(err.is_auth_error());
}

#[test]
fn test_is_auth_error_no_match() {
    let err = AppError::Api {
        status: StatusCode::FORBIDDEN,
        message: "Not your garage".to_string(),
    };
    assert!(!err.is_auth_error());

    assert!(!AppError::Network("connection refused".to_string()).is_auth_error());
    assert!(!AppError::MissingScope("garage").is_auth_error());
    assert!(!AppError::Conflict("already started".to_string()).is_auth_error());
}

#[test]
fn test_status_only_for_api_errors() {
    assert_eq!(AppError::Unauthorized.status(), Some(StatusCode::UNAUTHORIZED));

    let err = AppError::Api {
        status: StatusCode::NOT_FOUND,
        message: "Task not found".to_string(),
    };
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.to_string(), "API error (HTTP 404 Not Found): Task not found");

    assert_eq!(AppError::NotAuthenticated.status(), None);
    assert_eq!(AppError::Validation("bad email".to_string()).status(), None);
}

#[test]
fn test_internal_from_anyhow() {
    let err: AppError = anyhow::anyhow!("cache directory vanished").into();
    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(err.to_string(), "Internal error: cache directory vanished");
}
