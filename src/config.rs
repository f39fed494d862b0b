//! Application configuration loaded from environment variables.
//!
//! Firebase-style `FIREBASE_CONFIG_*` variables take precedence over the
//! plain ones so the same binary runs locally and in a deployed function.

use std::env;
use std::fmt;
use std::time::Duration;

/// Redirect URI registered with Strava for local development.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/exchange_token";

/// Strava OAuth client credentials.
///
/// Either half may be absent; operations that need it report a
/// configuration error per request instead of refusing to start.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id_set", &self.client_id.is_some())
            .field("client_secret_set", &self.client_secret.is_some())
            .finish()
    }
}

/// Bounds for the token endpoint retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(10),
            backoff: Duration::from_secs(1),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Redirect URI used when the caller does not supply one.
    pub expected_redirect_uri: String,
    pub retry: RetryPolicy,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let max_attempts = match env::var("STRAVA_TOKEN_MAX_RETRIES") {
            Ok(raw) => {
                let n: u32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("STRAVA_TOKEN_MAX_RETRIES", raw.clone()))?;
                if n == 0 {
                    return Err(ConfigError::Invalid("STRAVA_TOKEN_MAX_RETRIES", raw));
                }
                n
            }
            Err(_) => RetryPolicy::default().max_attempts,
        };

        let config = Self {
            credentials: Credentials {
                client_id: first_var(&["FIREBASE_CONFIG_STRAVA_CLIENT_ID", "STRAVA_CLIENT_ID"]),
                client_secret: first_var(&[
                    "FIREBASE_CONFIG_STRAVA_CLIENT_SECRET",
                    "STRAVA_CLIENT_SECRET",
                ]),
            },
            expected_redirect_uri: first_var(&[
                "FIREBASE_CONFIG_STRAVA_REDIRECT_URI",
                "EXPECTED_REDIRECT_URI",
            ])
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            retry: RetryPolicy {
                max_attempts,
                ..RetryPolicy::default()
            },
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        };

        if !config.credentials.is_complete() {
            tracing::error!(
                "Strava API credentials are missing; token endpoints will answer 500 until STRAVA_CLIENT_ID and STRAVA_CLIENT_SECRET are set"
            );
        }

        Ok(config)
    }

    /// Config for tests: fixed credentials and an instant retry backoff.
    pub fn test_default() -> Self {
        Self {
            credentials: Credentials::new("42", "test_secret"),
            expected_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            retry: RetryPolicy {
                backoff: Duration::ZERO,
                ..RetryPolicy::default()
            },
            port: 8080,
        }
    }
}

/// First non-empty value among `names`, trimmed.
fn first_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
