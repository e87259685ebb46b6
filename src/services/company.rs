// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The current user's company.

use super::cache::{DomainCache, Scope};
use crate::error::Result;
use crate::http::{api_path, ApiClient};
use crate::models::wire::entity_from_body;
use crate::models::Company;

#[derive(Clone)]
pub struct CompanyService {
    api: ApiClient,
    cache: DomainCache<Company>,
}

impl CompanyService {
    pub fn new(api: ApiClient, cache: DomainCache<Company>) -> Self {
        Self { api, cache }
    }

    fn scope(&self) -> Result<Scope> {
        self.api.tokens().company_scope()
    }

    pub fn get_from_cache(&self) -> Option<Company> {
        let scope = self.scope().ok()?;
        self.cache.load(&scope).into_iter().next()
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    pub async fn fetch_company(&self) -> Result<Company> {
        let scope = self.scope()?;
        let body = self
            .api
            .get_json(&api_path(&["companies", scope.id()]))
            .await?;
        let company: Company = entity_from_body(body, "company")?;

        self.cache.save(&scope, vec![company.clone()])?;
        Ok(company)
    }

    pub async fn get_company(&self) -> Result<Company> {
        match self.get_from_cache() {
            Some(company) => Ok(company),
            None => self.fetch_company().await,
        }
    }
}
