// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garages of the current company.

use super::cache::{DomainCache, Scope};
use crate::error::{AppError, Result};
use crate::http::{api_path, ApiClient};
use crate::models::wire::{entity_from_body, list_from_body};
use crate::models::{Garage, GarageCreateResponse, NewGarage, UpdateGarage};
use validator::Validate;

#[derive(Clone)]
pub struct GarageService {
    api: ApiClient,
    cache: DomainCache<Garage>,
}

impl GarageService {
    pub fn new(api: ApiClient, cache: DomainCache<Garage>) -> Self {
        Self { api, cache }
    }

    fn scope(&self) -> Result<Scope> {
        self.api.tokens().company_scope()
    }

    // ─── Cache ──────────────────────────────────────────────────────────────

    pub fn save_to_cache(&self, garages: Vec<Garage>) -> Result<()> {
        self.cache.save(&self.scope()?, garages)
    }

    pub fn get_from_cache(&self) -> Vec<Garage> {
        self.scope()
            .map(|scope| self.cache.load(&scope))
            .unwrap_or_default()
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    // ─── Reads ──────────────────────────────────────────────────────────────

    /// Fetch the company's garages and replace the cache.
    pub async fn fetch_company_garages(&self) -> Result<Vec<Garage>> {
        let scope = self.scope()?;
        let body = self
            .api
            .get_json(&api_path(&["garages", "company", scope.id()]))
            .await?;
        let garages: Vec<Garage> = list_from_body(body, "garages")?;

        tracing::info!(company_id = scope.id(), count = garages.len(), "Fetched garages");
        self.cache.save(&scope, garages.clone())?;
        Ok(garages)
    }

    /// Cached garages, fetched on a cold cache.
    pub async fn get_garages(&self) -> Result<Vec<Garage>> {
        let cached = self.cache.load(&self.scope()?);
        if cached.is_empty() {
            return self.fetch_company_garages().await;
        }
        Ok(cached)
    }

    pub async fn find_garage(&self, garage_id: &str) -> Result<Garage> {
        self.get_garages()
            .await?
            .into_iter()
            .find(|g| g.id == garage_id)
            .ok_or_else(|| AppError::NotFound(format!("Garage {}", garage_id)))
    }

    // ─── Mutations ──────────────────────────────────────────────────────────

    pub async fn create_garage(&self, garage: &NewGarage) -> Result<GarageCreateResponse> {
        garage.validate()?;
        let scope = self.scope()?;
        if garage.company_id != scope.id() {
            return Err(AppError::Validation(format!(
                "garage belongs to company {}, not the current company",
                garage.company_id
            )));
        }

        let body = self.api.post_json("/garages", garage).await?;
        let created: GarageCreateResponse = serde_json::from_value(body)
            .map_err(|e| AppError::InvalidResponse(format!("bad garage creation response: {}", e)))?;

        tracing::info!(garage_id = %created.garage.id, "Garage created");
        let garage = created.garage.clone();
        self.cache.update(&scope, |garages| {
            garages.retain(|g| g.id != garage.id);
            garages.push(garage);
        })?;
        Ok(created)
    }

    pub async fn update_garage(&self, garage_id: &str, update: &UpdateGarage) -> Result<Garage> {
        update.validate()?;
        let scope = self.scope()?;

        let body = self
            .api
            .patch_json(&api_path(&["garages", garage_id]), update)
            .await?;
        let garage: Garage = entity_from_body(body, "garage")?;

        let updated = garage.clone();
        self.cache.update(&scope, |garages| {
            match garages.iter_mut().find(|g| g.id == updated.id) {
                Some(existing) => *existing = updated,
                None => garages.push(updated),
            }
        })?;
        Ok(garage)
    }

    pub async fn delete_garage(&self, garage_id: &str) -> Result<()> {
        let scope = self.scope()?;
        self.api.delete(&api_path(&["garages", garage_id])).await?;

        tracing::info!(garage_id, "Garage deleted");
        self.cache
            .update(&scope, |garages| garages.retain(|g| g.id != garage_id))?;
        Ok(())
    }
}
