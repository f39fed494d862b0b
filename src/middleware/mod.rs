// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware and extractors shared by the routes.

pub mod auth;
pub mod security;

pub use auth::BearerToken;
