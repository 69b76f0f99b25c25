//! Zendesk OAuth provider
//!
//! Every endpoint lives under the account's subdomain, so construction
//! fails without one.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{AuthError, AuthResult};
use crate::oauth::{create_http_client, fetch_json};
use crate::provider::OAuth2Provider;
use crate::types::{json_string, NormalizedUser};

/// Zendesk OAuth provider
///
/// # Example
///
/// ```
/// use social_auth::providers::Zendesk;
/// use social_auth::{OAuth2Provider, ProviderConfig};
///
/// let config = ProviderConfig::new("id", "secret", "https://example.com/callback")
///     .with_subdomain("acme");
/// let provider = Zendesk::new(config).unwrap();
///
/// assert!(provider.auth_url().contains("acme.zendesk.com"));
/// ```
#[derive(Debug)]
pub struct Zendesk {
    config: ProviderConfig,
    auth_url: String,
    token_url: String,
    user_url: String,
}

impl Zendesk {
    /// Create a Zendesk adapter for the configured subdomain
    pub fn new(config: ProviderConfig) -> AuthResult<Self> {
        let subdomain = config
            .subdomain
            .clone()
            .filter(|subdomain| !subdomain.is_empty())
            .ok_or_else(|| {
                AuthError::Configuration("the Zendesk subdomain has not been specified".to_string())
            })?;

        Ok(Self {
            auth_url: format!("https://{}.zendesk.com/oauth/authorizations/new", subdomain),
            token_url: format!("https://{}.zendesk.com/oauth/tokens", subdomain),
            user_url: format!("https://{}.zendesk.com/api/v2/users/me.json", subdomain),
            config,
        })
    }

    /// Point every endpoint at `base` (used by tests)
    pub fn base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/oauth/authorizations/new", base);
        self.token_url = format!("{}/oauth/tokens", base);
        self.user_url = format!("{}/api/v2/users/me.json", base);
        self
    }
}

#[async_trait]
impl OAuth2Provider for Zendesk {
    fn id(&self) -> &str {
        "zendesk"
    }

    fn display_name(&self) -> &str {
        "Zendesk"
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
        &["read"]
    }

    async fn fetch_user_profile(&self, access_token: &str) -> AuthResult<Value> {
        let client = create_http_client(self.config.proxy.as_deref());

        let payload = fetch_json(client.get(&self.user_url).bearer_auth(access_token)).await?;

        Ok(payload
            .get("user")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({})))
    }

    fn normalize(&self, raw: Value) -> NormalizedUser {
        NormalizedUser {
            id: json_string(&raw, "id").unwrap_or_default(),
            name: json_string(&raw, "name"),
            nickname: None,
            email: json_string(&raw, "email"),
            avatar: None,
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> Zendesk {
        Zendesk::new(
            ProviderConfig::new("client-id", "client-secret", "https://example.com/callback")
                .with_subdomain("acme"),
        )
        .unwrap()
    }

    #[test]
    fn test_zendesk_provider() {
        let provider = provider();

        assert_eq!(provider.id(), "zendesk");
        assert_eq!(
            provider.auth_url(),
            "https://acme.zendesk.com/oauth/authorizations/new"
        );
        assert_eq!(provider.token_url(), "https://acme.zendesk.com/oauth/tokens");
    }

    #[test]
    fn test_missing_subdomain() {
        let err = Zendesk::new(ProviderConfig::new("id", "secret", "https://example.com/cb"))
            .unwrap_err();

        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_empty_subdomain() {
        let config =
            ProviderConfig::new("id", "secret", "https://example.com/cb").with_subdomain("");

        assert!(Zendesk::new(config).is_err());
    }

    #[test]
    fn test_authorization_url() {
        let url = provider().authorization_url("zstate");

        assert!(url.starts_with("https://acme.zendesk.com/oauth/authorizations/new?"));
        assert!(url.contains("state=zstate"));
        assert!(url.contains("scope=read"));
    }

    #[test]
    fn test_normalize() {
        let user = provider().normalize(json!({
            "id": 9001,
            "name": "Ada Lovelace",
            "email": "ada@example.com"
        }));

        assert_eq!(user.id, "9001");
        assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(user.nickname.is_none());
        assert!(user.avatar.is_none());
    }
}
