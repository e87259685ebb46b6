// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key/value storage for the session and the domain caches.
//!
//! Two backends:
//! - [`MemoryStore`]: session-scoped, lost when the process exits
//! - [`FileStore`]: persistent JSON snapshots under the cache directory

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Storage key names as constants.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER: &str = "user";

    pub const GARAGES_CACHE: &str = "garages_cache";
    pub const USERS_CACHE: &str = "users_cache";
    pub const TASKS_CACHE: &str = "tasks_cache";
    pub const ANALYTICS_CACHE: &str = "analytics_cache";
    pub const COMPANY_CACHE: &str = "company_cache";

    /// Every scoped cache, cleared together on logout.
    pub const DOMAIN_CACHES: [&str; 5] = [
        GARAGES_CACHE,
        USERS_CACHE,
        TASKS_CACHE,
        ANALYTICS_CACHE,
        COMPANY_CACHE,
    ];
}

/// String key/value store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a JSON value.
///
/// Missing keys, read failures and malformed JSON all yield `None`; the
/// latter two are logged.
pub fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored value");
            None
        }
    }
}

/// Encode a value as JSON and store it.
pub fn write_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| crate::error::AppError::Storage(format!("Failed to encode {}: {}", key, e)))?;
    store.set(key, &raw)
}
