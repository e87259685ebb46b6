// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and domain cache logic.

pub mod analytics;
pub mod auth;
pub mod cache;
pub mod company;
pub mod garage;
pub mod task;
pub mod user;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use cache::{DomainCache, Scope};
pub use company::CompanyService;
pub use garage::GarageService;
pub use task::TaskService;
pub use user::UserService;
