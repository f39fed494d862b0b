// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth routes: consent URL, code exchange and token refresh.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth-url", get(auth_url))
        .route("/api/exchange-token", post(exchange_token))
        .route("/api/refresh-token", post(refresh_token))
}

/// Query parameters for building the consent URL.
#[derive(Deserialize)]
pub struct AuthUrlParams {
    /// Where Strava should send the user back to.
    /// If not provided, uses the configured expected redirect URI.
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    scopes: Option<String>,
}

#[derive(Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// Return the Strava authorization URL for the frontend to navigate to.
async fn auth_url(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthUrlParams>,
) -> Result<Json<AuthUrlResponse>> {
    let url = state
        .relay
        .build_authorization_url(params.redirect_uri.as_deref(), params.scopes.as_deref())?;
    Ok(Json(AuthUrlResponse { url }))
}

#[derive(Deserialize)]
pub struct ExchangeTokenRequest {
    #[serde(default)]
    code: Option<String>,
}

/// Exchange the authorization code from the OAuth redirect for tokens.
async fn exchange_token(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ExchangeTokenRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = body.map_err(invalid_body)?;
    tracing::info!(code_present = request.code.is_some(), "Token exchange request received");

    let token_data = state
        .relay
        .exchange_code_for_token(request.code.as_deref())
        .await?;
    Ok(Json(token_data))
}

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Trade a refresh token for a fresh access token.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = body.map_err(invalid_body)?;

    let token_data = state
        .relay
        .refresh_access_token(request.refresh_token.as_deref())
        .await?;
    Ok(Json(token_data))
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}
