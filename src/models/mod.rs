// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.
//!
//! Every entity has one canonical shape. Alternate field spellings sent by
//! older API versions are absorbed here, at deserialization time.

pub mod analytics;
pub mod auth;
pub mod company;
pub mod garage;
pub mod task;
pub mod user;
pub mod wire;

pub use analytics::{AnalyticsPeriod, GarageAnalytics, PeriodMetrics};
pub use auth::{AuthResponse, LoginCredentials};
pub use company::Company;
pub use garage::{Address, Garage, GarageCreateResponse, NewGarage, ServiceAccount, UpdateGarage};
pub use task::{NewTask, Task, TaskRecord, TaskStatus, UpdateTask};
pub use user::{NewUser, UpdateUser, User, UserPatch, UserRole};
