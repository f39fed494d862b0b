// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth relay between the browser app and Strava.
//!
//! Handles:
//! - Authorization URL construction
//! - Code exchange and token refresh, retried on network faults
//! - Bearer-authenticated reads (activities, athlete zones)
//! - Normalizing Strava failures into [`AppError`]

use crate::config::{Config, Credentials, RetryPolicy};
use crate::error::AppError;
use crate::models::{redact_token_response, TokenPayload};
use crate::services::strava::{
    StravaTransport, TransportFault, UpstreamResponse, STRAVA_ACTIVITIES_URL,
    STRAVA_ATHLETE_ZONES_URL, STRAVA_AUTHORIZATION_URL, STRAVA_TOKEN_URL,
};
use serde_json::Value;
use std::sync::Arc;

/// Scopes requested when the caller does not name any.
pub const DEFAULT_SCOPES: &str = "read,activity:read_all,profile:read_all";

/// Raw error bodies are cut to this many characters in messages and logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Which token operation is running, for messages and logs.
#[derive(Debug, Clone, Copy)]
enum TokenOp {
    Exchange,
    Refresh,
}

impl TokenOp {
    fn label(self) -> &'static str {
        match self {
            TokenOp::Exchange => "Token exchange",
            TokenOp::Refresh => "Token refresh",
        }
    }
}

/// Stateless relay; one instance is shared by all requests.
#[derive(Clone)]
pub struct OAuthRelay {
    transport: Arc<dyn StravaTransport>,
    credentials: Credentials,
    expected_redirect_uri: String,
    retry: RetryPolicy,
}

impl OAuthRelay {
    pub fn new(config: &Config, transport: Arc<dyn StravaTransport>) -> Self {
        Self {
            transport,
            credentials: config.credentials.clone(),
            expected_redirect_uri: config.expected_redirect_uri.clone(),
            retry: config.retry,
        }
    }

    pub fn client_id_set(&self) -> bool {
        self.credentials.client_id.is_some()
    }

    // ─── Authorization URL ───────────────────────────────────────────────────

    /// Build the Strava consent page URL.
    ///
    /// Values are templated as given; callers pass already-encoded strings.
    pub fn build_authorization_url(
        &self,
        redirect_uri: Option<&str>,
        scopes: Option<&str>,
    ) -> Result<String, AppError> {
        let redirect_uri = redirect_uri.unwrap_or(self.expected_redirect_uri.as_str());
        let scopes = scopes.unwrap_or(DEFAULT_SCOPES);

        tracing::info!(
            redirect_uri = %redirect_uri,
            client_id_set = self.client_id_set(),
            "Generating auth URL"
        );

        let client_id = self.credentials.client_id.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "Server configuration error: STRAVA_CLIENT_ID missing".to_string(),
            )
        })?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            STRAVA_AUTHORIZATION_URL, client_id, redirect_uri, scopes
        ))
    }

    // ─── Token Operations ────────────────────────────────────────────────────

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code_for_token(&self, code: Option<&str>) -> Result<Value, AppError> {
        let code = non_empty(code)
            .ok_or_else(|| AppError::Validation("No authorization code provided".to_string()))?;
        let (client_id, client_secret) = self.token_credentials()?;

        let payload = TokenPayload::AuthorizationCodeGrant {
            client_id,
            client_secret,
            code: code.to_string(),
        };
        self.token_request(TokenOp::Exchange, &payload).await
    }

    /// Mint a new access token from a refresh token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<Value, AppError> {
        let refresh_token = non_empty(refresh_token)
            .ok_or_else(|| AppError::Validation("No refresh token provided".to_string()))?;
        let (client_id, client_secret) = self.token_credentials()?;

        let payload = TokenPayload::RefreshTokenGrant {
            client_id,
            client_secret,
            refresh_token: refresh_token.to_string(),
        };
        self.token_request(TokenOp::Refresh, &payload).await
    }

    fn token_credentials(&self) -> Result<(String, String), AppError> {
        match (&self.credentials.client_id, &self.credentials.client_secret) {
            (Some(id), Some(secret)) => Ok((id.clone(), secret.clone())),
            _ => {
                tracing::error!("Strava API credentials are not configured on the server");
                Err(AppError::Configuration(
                    "Server configuration error: API credentials missing".to_string(),
                ))
            }
        }
    }

    async fn token_request(&self, op: TokenOp, payload: &TokenPayload) -> Result<Value, AppError> {
        tracing::info!(payload = %payload.redacted(), "{}: calling Strava", op.label());

        let response = self.post_token_with_retry(payload).await?;
        tracing::info!(status = response.status, "{} response status", op.label());

        if !response.is_success() {
            return Err(token_error(op, &response));
        }

        let token_data: Value = serde_json::from_str(&response.body).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Exception during {}: invalid JSON from Strava: {}",
                op.label().to_lowercase(),
                e
            ))
        })?;

        tracing::info!(
            response = %redact_token_response(&token_data),
            "{} successful",
            op.label()
        );
        Ok(token_data)
    }

    /// POST to the token endpoint, retrying only network-level faults.
    ///
    /// Any received response, whatever its status, ends the loop.
    pub async fn post_token_with_retry(
        &self,
        payload: &TokenPayload,
    ) -> Result<UpstreamResponse, AppError> {
        let form = payload.form_fields();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::info!(attempt, max_attempts, "Attempting token request");

            let fault = match self
                .transport
                .post_form(STRAVA_TOKEN_URL, &form, self.retry.timeout)
                .await
            {
                Ok(response) => return Ok(response),
                Err(fault) => fault,
            };

            if !fault.is_retryable() {
                tracing::error!(error = %fault, "Unexpected error during token request");
                return Err(AppError::Transport(fault.to_string()));
            }

            if attempt >= max_attempts {
                tracing::error!(
                    attempt,
                    error = %fault,
                    "Token request failed after all attempts"
                );
                return Err(AppError::Transport(fault.to_string()));
            }

            tracing::warn!(attempt, error = %fault, "Network error during token request, retrying");
            tokio::time::sleep(self.retry.backoff).await;
        }
    }

    // ─── Authenticated Reads ─────────────────────────────────────────────────

    /// List the athlete's activities, forwarding the caller's query string.
    pub async fn fetch_activities(
        &self,
        access_token: Option<&str>,
        query: &[(String, String)],
    ) -> Result<Value, AppError> {
        self.bearer_get("activities", STRAVA_ACTIVITIES_URL, access_token, query)
            .await
    }

    /// Fetch the athlete's heart-rate and power zones.
    pub async fn fetch_athlete_zones(&self, access_token: Option<&str>) -> Result<Value, AppError> {
        self.bearer_get("athlete zones", STRAVA_ATHLETE_ZONES_URL, access_token, &[])
            .await
    }

    async fn bearer_get(
        &self,
        what: &str,
        url: &str,
        access_token: Option<&str>,
        query: &[(String, String)],
    ) -> Result<Value, AppError> {
        let access_token = non_empty(access_token)
            .ok_or_else(|| AppError::Unauthorized(AppError::NO_ACCESS_TOKEN.to_string()))?;

        let response = self
            .transport
            .get(url, access_token, query)
            .await
            .map_err(|fault: TransportFault| {
                tracing::error!(error = %fault, "Error fetching {}", what);
                AppError::Transport(fault.to_string())
            })?;

        if !response.is_success() {
            tracing::error!(status = response.status, "Error fetching {}", what);
            return Err(match response.json() {
                Some(body) => AppError::UpstreamBody {
                    status: response.status,
                    body,
                },
                None => AppError::Upstream {
                    status: response.status,
                    message: format!("Strava API error: {}", response.status),
                },
            });
        }

        response.json().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Strava returned a non-JSON body for {}",
                what
            ))
        })
    }
}

/// The value as given, unless it is missing or blank.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalize a non-2xx token endpoint response.
fn token_error(op: TokenOp, response: &UpstreamResponse) -> AppError {
    let detail = match response.json() {
        Some(body) => {
            tracing::error!(body = %body, "{} error response", op.label());
            error_detail(&body)
        }
        None => {
            let snippet = truncate_chars(&response.body, ERROR_BODY_LIMIT);
            tracing::error!(body = %snippet, "{} error body", op.label());
            snippet.to_string()
        }
    };

    AppError::Upstream {
        status: response.status,
        message: format!("Strava API error: {} - {}", response.status, detail),
    }
}

/// Human-readable detail from a Strava JSON error body:
/// `message`, then `error`, then the whole body.
pub fn error_detail(body: &Value) -> String {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| body.to_string())
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
