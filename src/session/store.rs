// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UI-facing session state and navigation guard.

use super::token_store::{SessionSnapshot, TokenStore};
use crate::models::{User, UserRole};
use std::sync::Arc;
use tokio::sync::watch;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";
/// Path of the landing page after login.
pub const HOME_PATH: &str = "/";

/// A navigable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub requires_auth: bool,
}

impl Route {
    pub const LOGIN: Route = Route {
        path: LOGIN_PATH,
        requires_auth: false,
    };
    pub const HOME: Route = Route {
        path: HOME_PATH,
        requires_auth: true,
    };
}

/// Outcome of a navigation guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

/// Reactive projection of the [`TokenStore`].
#[derive(Clone)]
pub struct SessionStore {
    tokens: Arc<TokenStore>,
    state: watch::Receiver<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        let state = tokens.subscribe();
        Self { tokens, state }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Company of the current user, empty when logged out.
    pub fn company_id(&self) -> String {
        self.state
            .borrow()
            .user
            .as_ref()
            .map(|u| u.company_id.clone())
            .unwrap_or_default()
    }

    /// Garage of the current user, empty when logged out or not garage-bound.
    pub fn garage_id(&self) -> String {
        self.state
            .borrow()
            .user
            .as_ref()
            .and_then(|u| u.garage_id.clone())
            .unwrap_or_default()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.state.borrow().user.as_ref().map(|u| u.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|r| r.is_admin())
    }

    /// Wait until the session changes. Returns `false` if the token store is gone.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }

    /// Decide whether navigating to `to` is allowed.
    pub fn guard(&self, to: &Route) -> Navigation {
        let authenticated = self.is_authenticated();
        if to.requires_auth && !authenticated {
            Navigation::Redirect(LOGIN_PATH)
        } else if to.path == LOGIN_PATH && authenticated {
            Navigation::Redirect(HOME_PATH)
        } else {
            Navigation::Proceed
        }
    }

    pub fn logout(&self) {
        self.tokens.clear_session();
    }
}
