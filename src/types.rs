//! Shared wire and output types

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Normalized user record produced by every adapter
///
/// Constructed only after the identity provider has positively confirmed
/// the raw data (token exchange, signed-token verification, or OpenID
/// re-validation). The original provider payload is retained verbatim in
/// `raw` for consumers that need provider-specific fields.
#[derive(Debug, Clone)]
pub struct NormalizedUser {
    /// Stable provider-scoped identifier
    pub id: String,
    /// Display name, when the provider reports one
    pub name: Option<String>,
    /// Short handle or username
    pub nickname: Option<String>,
    /// Email address, when the provider exposes one
    pub email: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// The raw provider response, unmodified
    pub raw: Value,
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token for subsequent API requests
    pub access_token: String,
    /// Refresh token, when the provider issues one
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds
    pub expires_in: Option<i64>,
    /// Token type, usually "Bearer"
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Absolute expiry timestamp (RFC3339), derived from `expires_in`
    pub fn expires_at(&self) -> Option<String> {
        self.expires_in
            .map(|secs| (Utc::now() + Duration::seconds(secs)).to_rfc3339())
    }
}

/// Error body returned by OAuth endpoints
#[derive(Debug, Default, Deserialize)]
pub struct OAuthErrorResponse {
    /// Error code
    #[serde(default)]
    pub error: String,
    /// Human-readable error description
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Read a field as a display string, converting bare numbers
pub(crate) fn json_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_response_full() {
        let response: TokenResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_in": 3600,
            "token_type": "Bearer"
        }))
        .unwrap();

        assert_eq!(response.access_token, "abc");
        assert_eq!(response.refresh_token.as_deref(), Some("def"));
        assert!(response.expires_at().is_some());
    }

    #[test]
    fn test_token_response_minimal() {
        let response: TokenResponse =
            serde_json::from_value(json!({"access_token": "abc"})).unwrap();

        assert!(response.refresh_token.is_none());
        assert!(response.expires_in.is_none());
        assert!(response.expires_at().is_none());
    }

    #[test]
    fn test_error_response_defaults() {
        let response: OAuthErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.error, "");
        assert!(response.error_description.is_none());
    }

    #[test]
    fn test_json_string_converts_numbers() {
        let value = json!({"id": 12345, "name": "alice", "missing": null});

        assert_eq!(json_string(&value, "id").as_deref(), Some("12345"));
        assert_eq!(json_string(&value, "name").as_deref(), Some("alice"));
        assert_eq!(json_string(&value, "missing"), None);
        assert_eq!(json_string(&value, "absent"), None);
    }
}
