// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Company analytics (read-only).

use super::cache::{DomainCache, Scope};
use crate::error::Result;
use crate::http::{api_path, ApiClient};
use crate::models::wire::list_from_body;
use crate::models::GarageAnalytics;

#[derive(Clone)]
pub struct AnalyticsService {
    api: ApiClient,
    cache: DomainCache<GarageAnalytics>,
}

impl AnalyticsService {
    pub fn new(api: ApiClient, cache: DomainCache<GarageAnalytics>) -> Self {
        Self { api, cache }
    }

    fn scope(&self) -> Result<Scope> {
        self.api.tokens().company_scope()
    }

    pub fn save_to_cache(&self, analytics: Vec<GarageAnalytics>) -> Result<()> {
        self.cache.save(&self.scope()?, analytics)
    }

    pub fn get_from_cache(&self) -> Vec<GarageAnalytics> {
        self.scope()
            .map(|scope| self.cache.load(&scope))
            .unwrap_or_default()
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    pub async fn fetch_analytics(&self) -> Result<Vec<GarageAnalytics>> {
        let scope = self.scope()?;
        let body = self
            .api
            .get_json(&api_path(&["analytics", "company", scope.id()]))
            .await?;
        let analytics: Vec<GarageAnalytics> = list_from_body(body, "analytics")?;

        tracing::info!(company_id = scope.id(), garages = analytics.len(), "Fetched analytics");
        self.cache.save(&scope, analytics.clone())?;
        Ok(analytics)
    }

    pub async fn get_analytics(&self) -> Result<Vec<GarageAnalytics>> {
        let cached = self.cache.load(&self.scope()?);
        if cached.is_empty() {
            return self.fetch_analytics().await;
        }
        Ok(cached)
    }

    /// Analytics of one garage, if the company report includes it.
    pub async fn for_garage(&self, garage_id: &str) -> Result<Option<GarageAnalytics>> {
        Ok(self
            .get_analytics()
            .await?
            .into_iter()
            .find(|a| a.garage_id == garage_id))
    }
}
