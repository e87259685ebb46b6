// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: credential storage and its UI-facing projection.

pub mod store;
pub mod token_store;

pub use store::{Navigation, Route, SessionStore};
pub use token_store::{SessionSnapshot, TokenStore};
