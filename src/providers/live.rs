//! Microsoft Live OAuth provider
//!
//! Uses the common-tenant Microsoft identity platform endpoints and reads
//! the profile from Microsoft Graph.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::AuthResult;
use crate::oauth::{create_http_client, fetch_json};
use crate::provider::OAuth2Provider;
use crate::types::{json_string, NormalizedUser};

/// Microsoft Live OAuth provider
#[derive(Debug)]
pub struct Live {
    config: ProviderConfig,
    auth_url: String,
    token_url: String,
    profile_url: String,
}

impl Live {
    /// Create a Live adapter
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            auth_url: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize".to_string(),
            token_url: "https://login.microsoftonline.com/common/oauth2/v2.0/token".to_string(),
            profile_url: "https://graph.microsoft.com/v1.0/me".to_string(),
        }
    }

    /// Point every endpoint at `base` (used by tests)
    pub fn base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/common/oauth2/v2.0/authorize", base);
        self.token_url = format!("{}/common/oauth2/v2.0/token", base);
        self.profile_url = format!("{}/v1.0/me", base);
        self
    }
}

#[async_trait]
impl OAuth2Provider for Live {
    fn id(&self) -> &str {
        "live"
    }

    fn display_name(&self) -> &str {
        "Microsoft Live"
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
        &["User.Read", "User.ReadBasic.All"]
    }

    async fn fetch_user_profile(&self, access_token: &str) -> AuthResult<Value> {
        let client = create_http_client(self.config.proxy.as_deref());

        fetch_json(
            client
                .get(&self.profile_url)
                .header(reqwest::header::ACCEPT, "application/json")
                .bearer_auth(access_token),
        )
        .await
    }

    fn normalize(&self, raw: Value) -> NormalizedUser {
        NormalizedUser {
            id: json_string(&raw, "id").unwrap_or_default(),
            name: json_string(&raw, "displayName"),
            nickname: None,
            email: json_string(&raw, "userPrincipalName"),
            avatar: None,
            raw,
        }
    }
}
