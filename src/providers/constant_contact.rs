//! Constant Contact OAuth provider
//!
//! Server-flow credentials go in an HTTP Basic header; the token request
//! body carries only the grant fields.
//!
//! See <https://v3.developer.constantcontact.com/api_guide/server_flow.html>

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::AuthResult;
use crate::oauth::{create_http_client, fetch_json};
use crate::provider::OAuth2Provider;
use crate::types::{json_string, NormalizedUser};

/// Constant Contact OAuth provider
#[derive(Debug)]
pub struct ConstantContact {
    config: ProviderConfig,
    auth_url: String,
    token_url: String,
    profile_url: String,
}

impl ConstantContact {
    /// Create a Constant Contact adapter
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            auth_url: "https://authz.constantcontact.com/oauth2/default/v1/authorize".to_string(),
            token_url: "https://authz.constantcontact.com/oauth2/default/v1/token".to_string(),
            profile_url: "https://api.cc.email/v3/account/summary".to_string(),
        }
    }

    /// Point every endpoint at `base` (used by tests)
    pub fn base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/oauth2/default/v1/authorize", base);
        self.token_url = format!("{}/oauth2/default/v1/token", base);
        self.profile_url = format!("{}/v3/account/summary", base);
        self
    }
}

#[async_trait]
impl OAuth2Provider for ConstantContact {
    fn id(&self) -> &str {
        "constantcontact"
    }

    fn display_name(&self) -> &str {
        "Constant Contact"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn auth_url(&self) -> &str {
        &self.auth_url
    }

    fn token_url(&self) -> &str {
        &self.token_url
    }

    fn default_scopes(&self) -> &[&str] {
        &[]
    }

    fn uses_basic_auth(&self) -> bool {
        true
    }

    async fn fetch_user_profile(&self, access_token: &str) -> AuthResult<Value> {
        let client = create_http_client(self.config.proxy.as_deref());

        fetch_json(client.get(&self.profile_url).bearer_auth(access_token)).await
    }

    fn normalize(&self, raw: Value) -> NormalizedUser {
        let first = json_string(&raw, "first_name");
        let last = json_string(&raw, "last_name");
        let name = match (&first, &last) {
            (None, None) => None,
            _ => Some(
                format!(
                    "{} {}",
                    first.unwrap_or_default(),
                    last.unwrap_or_default()
                )
                .trim()
                .to_string(),
            ),
        };

        NormalizedUser {
            id: json_string(&raw, "encoded_account_id").unwrap_or_default(),
            name,
            nickname: None,
            email: json_string(&raw, "contact_email"),
            avatar: None,
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> ConstantContact {
        ConstantContact::new(ProviderConfig::new(
            "client-id",
            "client-secret",
            "https://example.com/callback",
        ))
    }

    #[test]
    fn test_constant_contact_provider() {
        let provider = provider();

        assert_eq!(provider.id(), "constantcontact");
        assert!(provider.auth_url().contains("authz.constantcontact.com"));
        assert!(provider.token_url().contains("authz.constantcontact.com"));
        assert!(provider.uses_basic_auth());
    }

    #[test]
    fn test_authorization_url() {
        let url = provider().authorization_url("the-state");

        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=the-state"));
        // no default scopes, so no scope parameter at all
        assert!(!url.contains("scope="));
    }

    #[test]
    fn test_normalize() {
        let user = provider().normalize(json!({
            "encoded_account_id": "abc123",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "contact_email": "ada@example.com"
        }));

        assert_eq!(user.id, "abc123");
        assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(user.nickname.is_none());
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_normalize_missing_fields() {
        let user = provider().normalize(json!({"encoded_account_id": "abc123"}));

        assert_eq!(user.id, "abc123");
        assert!(user.name.is_none());
        assert!(user.email.is_none());
        assert_eq!(user.raw["encoded_account_id"], "abc123");
    }
}
