//! Gitee OAuth provider
//!
//! Profile calls authenticate with the access token as a query parameter.
//! With the `emails` scope active, a second lookup resolves the confirmed
//! primary email; that lookup degrades to a null email on failure instead
//! of failing the whole authentication.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::AuthResult;
use crate::oauth::{create_http_client, fetch_json};
use crate::provider::OAuth2Provider;
use crate::types::{json_string, NormalizedUser};

/// Gitee OAuth provider
#[derive(Debug)]
pub struct Gitee {
    config: ProviderConfig,
    auth_url: String,
    token_url: String,
    user_url: String,
    emails_url: String,
}

impl Gitee {
    /// Create a Gitee adapter
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            auth_url: "https://gitee.com/oauth/authorize".to_string(),
            token_url: "https://gitee.com/oauth/token".to_string(),
            user_url: "https://gitee.com/api/v5/user".to_string(),
            emails_url: "https://gitee.com/api/v5/emails".to_string(),
        }
    }

    /// Point every endpoint at `base` (used by tests)
    pub fn base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/oauth/authorize", base);
        self.token_url = format!("{}/oauth/token", base);
        self.user_url = format!("{}/api/v5/user", base);
        self.emails_url = format!("{}/api/v5/emails", base);
        self
    }

    /// Resolve the confirmed primary email, or nothing on any failure
    async fn fetch_primary_email(
        &self,
        client: &reqwest::Client,
        access_token: &str,
    ) -> Option<String> {
        let emails = fetch_json(
            client
                .get(&self.emails_url)
                .query(&[("access_token", access_token)]),
        )
        .await
        .ok()?;

        for email in emails.as_array()? {
            let confirmed = email["state"].as_str() == Some("confirmed");
            let primary = email["scope"]
                .as_array()
                .is_some_and(|scopes| scopes.iter().any(|s| s.as_str() == Some("primary")));

            if confirmed && primary {
                return email["email"].as_str().map(str::to_string);
            }
        }

        None
    }
}

#[async_trait]
impl OAuth2Provider for Gitee {
    fn id(&self) -> &str {
        "gitee"
    }

    fn display_name(&self) -> &str {
        "Gitee"
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
        &["user_info", "emails"]
    }

    async fn fetch_user_profile(&self, access_token: &str) -> AuthResult<Value> {
        let client = create_http_client(self.config.proxy.as_deref());

        let mut user = fetch_json(
            client
                .get(&self.user_url)
                .query(&[("access_token", access_token)]),
        )
        .await?;

        if self.scopes().iter().any(|scope| scope == "emails") {
            let email = self.fetch_primary_email(&client, access_token).await;
            if let Some(map) = user.as_object_mut() {
                map.insert(
                    "email".to_string(),
                    email.map(Value::String).unwrap_or(Value::Null),
                );
            }
        }

        Ok(user)
    }

    fn normalize(&self, raw: Value) -> NormalizedUser {
        NormalizedUser {
            id: json_string(&raw, "id").unwrap_or_default(),
            // Gitee's "name" is the display handle and "login" the account
            // name; the crossover below is the provider's own convention
            nickname: json_string(&raw, "name"),
            name: json_string(&raw, "login"),
            email: json_string(&raw, "email"),
            avatar: json_string(&raw, "avatar_url"),
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> Gitee {
        Gitee::new(ProviderConfig::new(
            "client-id",
            "client-secret",
            "https://example.com/callback",
        ))
    }

    #[test]
    fn test_gitee_provider() {
        let provider = provider();

        assert_eq!(provider.id(), "gitee");
        assert!(provider.auth_url().contains("gitee.com"));
        assert!(provider.token_url().contains("gitee.com"));
        assert!(!provider.uses_basic_auth());
    }

    #[test]
    fn test_authorization_url_default_scopes() {
        let url = provider().authorization_url("xyz");

        assert!(url.contains("scope=user_info%20emails"));
        assert!(url.contains("state=xyz"));
    }

    #[test]
    fn test_normalize_field_crossover() {
        let user = provider().normalize(json!({
            "id": 42,
            "login": "alovelace",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "avatar_url": "https://gitee.com/avatar.png"
        }));

        assert_eq!(user.id, "42");
        assert_eq!(user.nickname.as_deref(), Some("Ada Lovelace"));
        assert_eq!(user.name.as_deref(), Some("alovelace"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(user.avatar.as_deref(), Some("https://gitee.com/avatar.png"));
    }

    #[test]
    fn test_normalize_missing_optionals() {
        let user = provider().normalize(json!({"id": 42, "login": "alovelace"}));

        assert_eq!(user.id, "42");
        assert!(user.nickname.is_none());
        assert!(user.email.is_none());
        assert!(user.avatar.is_none());
    }
}
