// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garage-Desk: client core for the garage workshop desktop application.
//!
//! This crate provides the session handling, the tenant-scoped caches of
//! garage API data, and the NFC reader bridge consumed by the UI.

pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod models;
pub mod reader;
pub mod services;
pub mod session;
pub mod storage;

use config::Config;
use error::Result;
use events::{ChangeNotifier, Domain};
use http::ApiClient;
use services::{
    AnalyticsService, AuthService, CompanyService, DomainCache, GarageService, TaskService,
    UserService,
};
use session::{SessionStore, TokenStore};
use std::sync::Arc;
use storage::{keys, FileStore, KvStore, MemoryStore};

/// Every client component, wired together once at startup.
pub struct AppContext {
    pub config: Config,
    pub notifier: ChangeNotifier,
    pub tokens: Arc<TokenStore>,
    pub session: SessionStore,
    pub api: ApiClient,
    pub auth: AuthService,
    pub garages: GarageService,
    pub users: UserService,
    pub tasks: TaskService,
    pub analytics: AnalyticsService,
    pub company: CompanyService,
}

impl AppContext {
    /// Build the context with an in-memory session and file-backed caches
    /// under `config.cache_dir`.
    pub fn new(config: Config) -> Result<Self> {
        let caches = FileStore::open(&config.cache_dir)?;
        Self::with_stores(config, Arc::new(MemoryStore::new()), Arc::new(caches))
    }

    pub fn with_stores(
        config: Config,
        session_store: Arc<dyn KvStore>,
        cache_store: Arc<dyn KvStore>,
    ) -> Result<Self> {
        let notifier = ChangeNotifier::default();
        let tokens = Arc::new(TokenStore::new(
            session_store,
            cache_store.clone(),
            notifier.clone(),
        ));
        let api = ApiClient::new(&config.api_base_url, tokens.clone())?;

        let store = &cache_store;
        let users = UserService::new(
            api.clone(),
            DomainCache::new(keys::USERS_CACHE, Domain::Users, store.clone(), notifier.clone()),
        );
        let garages = GarageService::new(
            api.clone(),
            DomainCache::new(keys::GARAGES_CACHE, Domain::Garages, store.clone(), notifier.clone()),
        );
        let tasks = TaskService::new(
            api.clone(),
            DomainCache::new(keys::TASKS_CACHE, Domain::Tasks, store.clone(), notifier.clone()),
            users.clone(),
        );
        let analytics = AnalyticsService::new(
            api.clone(),
            DomainCache::new(
                keys::ANALYTICS_CACHE,
                Domain::Analytics,
                store.clone(),
                notifier.clone(),
            ),
        );
        let company = CompanyService::new(
            api.clone(),
            DomainCache::new(keys::COMPANY_CACHE, Domain::Company, store.clone(), notifier.clone()),
        );

        Ok(Self {
            session: SessionStore::new(tokens.clone()),
            auth: AuthService::new(api.clone()),
            config,
            notifier,
            tokens,
            api,
            garages,
            users,
            tasks,
            analytics,
            company,
        })
    }
}
