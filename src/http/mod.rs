// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP pipeline to the garage API.

pub mod client;

pub use client::{api_path, ApiClient, ApiRequest};
