// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Adapters between raw API bodies and canonical models.
//!
//! Endpoints are inconsistent about wrapping: a list may arrive bare
//! (`[...]`) or wrapped (`{"garages": [...]}`), a single entity bare or as
//! `{"garage": {...}}`.

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract a list from a bare array or from `body[field]`.
pub fn list_from_body<T: DeserializeOwned>(body: Value, field: &str) -> Result<Vec<T>> {
    let list = match body {
        Value::Array(_) => body,
        Value::Object(mut map) => match map.remove(field) {
            Some(list @ Value::Array(_)) => list,
            _ => {
                return Err(AppError::InvalidResponse(format!(
                    "expected a list under {:?}",
                    field
                )))
            }
        },
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(AppError::InvalidResponse(format!(
                "expected a list of {}",
                field
            )))
        }
    };

    serde_json::from_value(list)
        .map_err(|e| AppError::InvalidResponse(format!("bad {} list: {}", field, e)))
}

/// Extract an entity from `body[field]` when wrapped, else from the body itself.
pub fn entity_from_body<T: DeserializeOwned>(body: Value, field: &str) -> Result<T> {
    let entity = match body {
        Value::Object(mut map) if matches!(map.get(field), Some(Value::Object(_))) => {
            map.remove(field).unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(entity)
        .map_err(|e| AppError::InvalidResponse(format!("bad {}: {}", field, e)))
}
