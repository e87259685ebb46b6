// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scoped snapshot cache shared by every domain service.
//!
//! Each domain persists one envelope `{ scope, items }` under a fixed key.
//! A snapshot written for one company or garage is never served to a user
//! of another: a scope mismatch reads as a cold cache. Snapshots never
//! expire on their own; they are replaced by fetches and mutations and
//! dropped on logout.

use crate::error::{AppError, Result};
use crate::events::{ChangeEvent, ChangeNotifier, Domain};
use crate::models::User;
use crate::storage::{self, KvStore};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Tenant partition of cached data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    Company(String),
    Garage(String),
}

impl Scope {
    /// The user's company scope.
    pub fn company_of(user: &User) -> Result<Self> {
        if user.company_id.is_empty() {
            return Err(AppError::MissingScope("company"));
        }
        Ok(Scope::Company(user.company_id.clone()))
    }

    /// The user's garage scope.
    pub fn garage_of(user: &User) -> Result<Self> {
        user.garage_id
            .clone()
            .filter(|id| !id.is_empty())
            .map(Scope::Garage)
            .ok_or(AppError::MissingScope("garage"))
    }

    /// Garage scope for garage-bound accounts, company scope otherwise.
    pub fn workplace_of(user: &User) -> Result<Self> {
        Self::garage_of(user).or_else(|_| Self::company_of(user))
    }

    pub fn id(&self) -> &str {
        match self {
            Scope::Company(id) | Scope::Garage(id) => id,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Company(id) => write!(f, "company:{}", id),
            Scope::Garage(id) => write!(f, "garage:{}", id),
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}

impl TryFrom<String> for Scope {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.split_once(':') {
            Some(("company", id)) if !id.is_empty() => Ok(Scope::Company(id.to_string())),
            Some(("garage", id)) if !id.is_empty() => Ok(Scope::Garage(id.to_string())),
            _ => Err(format!("invalid cache scope {:?}", value)),
        }
    }
}

/// Persisted form of a domain cache.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    scope: Scope,
    items: Vec<T>,
}

/// Typed handle on one domain's persisted snapshot.
pub struct DomainCache<T> {
    key: &'static str,
    domain: Domain,
    store: Arc<dyn KvStore>,
    notifier: ChangeNotifier,
    _items: PhantomData<fn() -> T>,
}

impl<T> Clone for DomainCache<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            domain: self.domain,
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            _items: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> DomainCache<T> {
    pub fn new(
        key: &'static str,
        domain: Domain,
        store: Arc<dyn KvStore>,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            key,
            domain,
            store,
            notifier,
            _items: PhantomData,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Overwrite the snapshot.
    pub fn save(&self, scope: &Scope, items: Vec<T>) -> Result<()> {
        let count = items.len();
        let envelope = Envelope {
            scope: scope.clone(),
            items,
        };
        storage::write_json(self.store.as_ref(), self.key, &envelope)?;
        tracing::debug!(domain = self.domain.as_str(), scope = %scope, count, "Cache saved");
        self.notifier.publish(ChangeEvent::CacheUpdated(self.domain));
        Ok(())
    }

    /// Snapshot for `scope`; empty when absent, unreadable or owned by another scope.
    pub fn load(&self, scope: &Scope) -> Vec<T> {
        self.load_envelope(scope).unwrap_or_default()
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(self.key)?;
        tracing::debug!(domain = self.domain.as_str(), "Cache cleared");
        self.notifier.publish(ChangeEvent::CacheCleared(self.domain));
        Ok(())
    }

    /// Edit the snapshot for `scope` in place.
    ///
    /// Does nothing when there is no snapshot for `scope`: a partial list
    /// would otherwise pass for a warm cache. Returns whether a snapshot
    /// was written.
    pub fn update<F>(&self, scope: &Scope, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<T>),
    {
        let Some(mut items) = self.load_envelope(scope) else {
            return Ok(false);
        };
        edit(&mut items);
        self.save(scope, items)?;
        Ok(true)
    }

    fn load_envelope(&self, scope: &Scope) -> Option<Vec<T>> {
        let envelope: Envelope<T> = storage::read_json(self.store.as_ref(), self.key)?;
        if envelope.scope != *scope {
            tracing::debug!(
                domain = self.domain.as_str(),
                cached = %envelope.scope,
                current = %scope,
                "Ignoring cache from another scope"
            );
            return None;
        }
        Some(envelope.items)
    }
}
