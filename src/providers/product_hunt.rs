//! Product Hunt OAuth provider
//!
//! The profile endpoint is a GraphQL API; a fixed viewer query pulls the
//! authenticated user, and the inner `data.viewer.user` object is kept as
//! the raw payload.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::AuthResult;
use crate::oauth::{create_http_client, fetch_json};
use crate::provider::OAuth2Provider;
use crate::types::{json_string, NormalizedUser};

const VIEWER_QUERY: &str = "{ viewer { user { id name profileImage username } } }";

/// Product Hunt OAuth provider
#[derive(Debug)]
pub struct ProductHunt {
    config: ProviderConfig,
    auth_url: String,
    token_url: String,
    graphql_url: String,
}

impl ProductHunt {
    /// Create a Product Hunt adapter
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            auth_url: "https://api.producthunt.com/v2/oauth/authorize".to_string(),
            token_url: "https://api.producthunt.com/v2/oauth/token".to_string(),
            graphql_url: "https://api.producthunt.com/v2/api/graphql".to_string(),
        }
    }

    /// Point every endpoint at `base` (used by tests)
    pub fn base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/v2/oauth/authorize", base);
        self.token_url = format!("{}/v2/oauth/token", base);
        self.graphql_url = format!("{}/v2/api/graphql", base);
        self
    }
}

#[async_trait]
impl OAuth2Provider for ProductHunt {
    fn id(&self) -> &str {
        "producthunt"
    }

    fn display_name(&self) -> &str {
        "Product Hunt"
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
        &["public", "private"]
    }

    async fn fetch_user_profile(&self, access_token: &str) -> AuthResult<Value> {
        let client = create_http_client(self.config.proxy.as_deref());

        let payload = fetch_json(
            client
                .post(&self.graphql_url)
                .header(reqwest::header::ACCEPT, "application/json")
                .bearer_auth(access_token)
                .json(&serde_json::json!({ "query": VIEWER_QUERY })),
        )
        .await?;

        Ok(payload
            .pointer("/data/viewer/user")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({})))
    }

    fn normalize(&self, raw: Value) -> NormalizedUser {
        NormalizedUser {
            id: json_string(&raw, "id").unwrap_or_default(),
            name: json_string(&raw, "name"),
            nickname: json_string(&raw, "username"),
            email: None,
            avatar: json_string(&raw, "profileImage"),
            raw,
        }
    }
}
