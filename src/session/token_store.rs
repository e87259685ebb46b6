// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token store: owns the access token, refresh token and user profile.
//!
//! Lifecycle:
//! - set on login and on every successful refresh
//! - cleared on logout and on refresh failure, which also drops every
//!   scoped domain cache so the next user never sees the previous tenant's
//!   data

use crate::error::{AppError, Result};
use crate::events::{ChangeEvent, ChangeNotifier, Domain};
use crate::models::{AuthResponse, User};
use crate::services::Scope;
use crate::storage::{self, keys, KvStore};
use std::sync::Arc;
use tokio::sync::watch;

/// What the UI can observe about the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub user: Option<User>,
}

/// Credential store with cascade invalidation.
pub struct TokenStore {
    /// Session-scoped storage (tokens and user)
    session: Arc<dyn KvStore>,
    /// Persistent storage holding the domain caches
    caches: Arc<dyn KvStore>,
    notifier: ChangeNotifier,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl TokenStore {
    pub fn new(
        session: Arc<dyn KvStore>,
        caches: Arc<dyn KvStore>,
        notifier: ChangeNotifier,
    ) -> Self {
        let store = Self {
            session,
            caches,
            notifier,
            snapshot: watch::Sender::new(SessionSnapshot::default()),
        };
        store.snapshot.send_replace(store.current_snapshot());
        store
    }

    /// Store a login or refresh response.
    ///
    /// A response without a user keeps the user already stored.
    pub fn set_session(&self, resp: &AuthResponse) -> Result<()> {
        self.session.set(keys::ACCESS_TOKEN, &resp.access_token)?;
        self.session.set(keys::REFRESH_TOKEN, &resp.refresh_token)?;
        if let Some(user) = &resp.user {
            storage::write_json(self.session.as_ref(), keys::USER, user)?;
        }

        let snapshot = self.current_snapshot();
        tracing::debug!(
            user_id = snapshot.user.as_ref().map(|u| u.id.as_str()),
            "Session stored"
        );
        self.snapshot.send_replace(snapshot);
        self.notifier.publish(ChangeEvent::SessionStarted);
        Ok(())
    }

    /// Drop the credentials and every scoped domain cache.
    ///
    /// Never fails: storage errors are logged and the remaining keys are
    /// still removed.
    pub fn clear_session(&self) {
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN, keys::USER] {
            if let Err(e) = self.session.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove session key");
            }
        }

        for (key, domain) in keys::DOMAIN_CACHES.iter().zip(Domain::ALL) {
            if let Err(e) = self.caches.remove(key) {
                tracing::warn!(key, error = %e, "Failed to clear cache on logout");
            }
            self.notifier.publish(ChangeEvent::CacheCleared(domain));
        }

        self.snapshot.send_replace(SessionSnapshot::default());
        self.notifier.publish(ChangeEvent::SessionCleared);
        tracing::info!("Session cleared");
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_key(keys::ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_key(keys::REFRESH_TOKEN)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// The stored user, normalized to the canonical shape.
    ///
    /// `None` when logged out or when the stored record is unreadable.
    pub fn get_user(&self) -> Option<User> {
        if !self.is_authenticated() {
            return None;
        }
        storage::read_json(self.session.as_ref(), keys::USER)
    }

    /// The stored user, or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<User> {
        self.get_user().ok_or(AppError::NotAuthenticated)
    }

    /// Company the current user belongs to.
    pub fn company_scope(&self) -> Result<Scope> {
        Scope::company_of(&self.require_user()?)
    }

    /// Garage the current user is bound to; `MissingScope` for company-wide accounts.
    pub fn garage_scope(&self) -> Result<Scope> {
        Scope::garage_of(&self.require_user()?)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.session.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read session key");
                None
            }
        }
    }

    fn current_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            authenticated: self.is_authenticated(),
            user: self.get_user(),
        }
    }
}
