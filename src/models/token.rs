//! OAuth token request payloads and log redaction helpers.

use serde_json::{Map, Value};

/// Placeholder written to logs in place of credentials.
pub const REDACTED: &str = "[REDACTED]";

/// Fields of a token response that must never reach a log line.
const TOKEN_RESPONSE_SECRETS: &[&str] = &["access_token", "refresh_token"];

/// Form body sent to the Strava token endpoint.
#[derive(Clone)]
pub enum TokenPayload {
    AuthorizationCodeGrant {
        client_id: String,
        client_secret: String,
        code: String,
    },
    RefreshTokenGrant {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl TokenPayload {
    pub fn grant_type(&self) -> &'static str {
        match self {
            TokenPayload::AuthorizationCodeGrant { .. } => "authorization_code",
            TokenPayload::RefreshTokenGrant { .. } => "refresh_token",
        }
    }

    /// Key/value pairs for `application/x-www-form-urlencoded` encoding.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            TokenPayload::AuthorizationCodeGrant {
                client_id,
                client_secret,
                code,
            } => vec![
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", self.grant_type()),
            ],
            TokenPayload::RefreshTokenGrant {
                client_id,
                client_secret,
                refresh_token,
            } => vec![
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", self.grant_type()),
            ],
        }
    }

    /// JSON view of the payload safe to log.
    pub fn redacted(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in self.form_fields() {
            let shown = match key {
                "client_secret" | "refresh_token" => REDACTED,
                _ => value,
            };
            map.insert(key.to_string(), Value::String(shown.to_string()));
        }
        Value::Object(map)
    }
}

// Payloads carry the client secret; keep them out of `{:?}` output.
impl std::fmt::Debug for TokenPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenPayload({})", self.redacted())
    }
}

/// Copy of a token response with the bearer credentials masked.
///
/// Non-object responses are returned unchanged.
pub fn redact_token_response(response: &Value) -> Value {
    match response {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if TOKEN_RESPONSE_SECRETS.contains(&k.as_str()) {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), v.clone())
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
