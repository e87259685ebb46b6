// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Users of the current company, including NFC card association.

use super::cache::{DomainCache, Scope};
use crate::error::{AppError, Result};
use crate::http::{api_path, ApiClient};
use crate::models::wire::{entity_from_body, list_from_body};
use crate::models::{NewUser, UpdateUser, User, UserPatch};
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
    cache: DomainCache<User>,
}

impl UserService {
    pub fn new(api: ApiClient, cache: DomainCache<User>) -> Self {
        Self { api, cache }
    }

    fn scope(&self) -> Result<Scope> {
        self.api.tokens().company_scope()
    }

    // ─── Cache ──────────────────────────────────────────────────────────────

    pub fn save_to_cache(&self, users: Vec<User>) -> Result<()> {
        self.cache.save(&self.scope()?, users)
    }

    pub fn get_from_cache(&self) -> Vec<User> {
        self.scope()
            .map(|scope| self.cache.load(&scope))
            .unwrap_or_default()
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Apply a local patch to one cached user. Returns whether the user was cached.
    pub fn update_user_in_cache(&self, user_id: &str, patch: &UserPatch) -> Result<bool> {
        let scope = self.scope()?;
        let mut found = false;
        self.cache.update(&scope, |users| {
            if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
                patch.apply(user);
                found = true;
            }
        })?;
        Ok(found)
    }

    /// Clear the task linkage of whoever holds `record_id`.
    pub(crate) fn release_record(&self, record_id: &str) -> Result<Option<String>> {
        let scope = self.scope()?;
        let mut released = None;
        self.cache.update(&scope, |users| {
            for user in users
                .iter_mut()
                .filter(|u| u.record_task_id.as_deref() == Some(record_id))
            {
                UserPatch::idle().apply(user);
                released = Some(user.id.clone());
            }
        })?;
        Ok(released)
    }

    fn store_user(&self, scope: &Scope, user: User) -> Result<()> {
        self.cache.update(scope, |users| {
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(existing) => *existing = user,
                None => users.push(user),
            }
        })?;
        Ok(())
    }

    // ─── Reads ──────────────────────────────────────────────────────────────

    /// Fetch the company's users and replace the cache.
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        let scope = self.scope()?;
        let body = self
            .api
            .get_json(&api_path(&["users", "company", scope.id()]))
            .await?;
        let users: Vec<User> = list_from_body(body, "users")?;

        tracing::info!(company_id = scope.id(), count = users.len(), "Fetched users");
        self.cache.save(&scope, users.clone())?;
        Ok(users)
    }

    /// Cached users, fetched on a cold cache.
    pub async fn get_users(&self) -> Result<Vec<User>> {
        let cached = self.cache.load(&self.scope()?);
        if cached.is_empty() {
            return self.fetch_users().await;
        }
        Ok(cached)
    }

    /// The worker holding a card. Service accounts and super administrators
    /// never match.
    pub async fn find_user_by_card_uid(&self, card_uid: &str) -> Result<Option<User>> {
        Ok(self
            .get_users()
            .await?
            .into_iter()
            .find(|u| u.role.is_worker() && u.card_uid.as_deref() == Some(card_uid)))
    }

    /// Workers without a card.
    pub async fn get_unassigned_users(&self) -> Result<Vec<User>> {
        Ok(self
            .get_users()
            .await?
            .into_iter()
            .filter(|u| u.role.is_worker() && u.card_uid.is_none())
            .collect())
    }

    // ─── Card association ───────────────────────────────────────────────────

    pub async fn associate_card(&self, user_id: &str, card_uid: &str) -> Result<User> {
        let card_uid = card_uid.trim();
        if card_uid.is_empty() {
            return Err(AppError::Validation("card uid is required".into()));
        }
        let scope = self.scope()?;

        let body = self
            .api
            .patch_json(
                &api_path(&["users", user_id, "associate-card"]),
                &serde_json::json!({ "card_uid": card_uid }),
            )
            .await?;
        let user: User = entity_from_body(body, "user")?;

        tracing::info!(user_id, "Card associated");
        self.store_user(&scope, user.clone())?;
        Ok(user)
    }

    pub async fn dissociate_card(&self, user_id: &str) -> Result<User> {
        let scope = self.scope()?;

        let body = self
            .api
            .patch(&api_path(&["users", user_id, "dissociate-card"]))
            .await?;
        let user: User = entity_from_body(body, "user")?;

        tracing::info!(user_id, "Card dissociated");
        self.store_user(&scope, user.clone())?;
        Ok(user)
    }

    // ─── User management ────────────────────────────────────────────────────

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        let scope = self.scope()?;

        let body = self.api.post_json("/users", user).await?;
        let created: User = entity_from_body(body, "user")?;

        tracing::info!(user_id = %created.id, "User created");
        if created.company_id == scope.id() {
            self.store_user(&scope, created.clone())?;
        }
        Ok(created)
    }

    pub async fn update_user(&self, user_id: &str, update: &UpdateUser) -> Result<User> {
        update.validate()?;
        let scope = self.scope()?;

        let body = self
            .api
            .patch_json(&api_path(&["users", user_id]), update)
            .await?;
        let user: User = entity_from_body(body, "user")?;

        self.store_user(&scope, user.clone())?;
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let scope = self.scope()?;
        self.api.delete(&api_path(&["users", user_id])).await?;

        tracing::info!(user_id, "User deleted");
        self.cache
            .update(&scope, |users| users.retain(|u| u.id != user_id))?;
        Ok(())
    }
}
