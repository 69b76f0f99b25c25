//! OAuth2 provider abstraction
//!
//! Provides the `OAuth2Provider` trait implemented by every OAuth2-speaking
//! provider. Implementations describe their endpoints and conventions; the
//! flow itself (authorization URL assembly, token exchange) lives in shared
//! helpers under [`crate::oauth`] so there is no inheritance hierarchy to
//! climb — a provider overrides an operation only when its wire contract
//! actually differs.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::AuthResult;
use crate::oauth;
use crate::types::{NormalizedUser, TokenResponse};

/// Trait for OAuth2 provider implementations
///
/// # Example
///
/// ```
/// use social_auth::providers::Gitee;
/// use social_auth::{OAuth2Provider, ProviderConfig};
///
/// let config = ProviderConfig::new("client-id", "client-secret", "https://example.com/callback");
/// let provider = Gitee::new(config);
///
/// let url = provider.authorization_url("random-state");
/// assert!(url.contains("client_id=client-id"));
/// ```
#[async_trait]
pub trait OAuth2Provider: Send + Sync {
    /// Provider identifier (e.g. "gitee", "zendesk")
    fn id(&self) -> &str;

    /// Human-readable provider name
    fn display_name(&self) -> &str;

    /// The configuration this adapter was constructed with
    fn config(&self) -> &ProviderConfig;

    /// Authorization endpoint URL
    fn auth_url(&self) -> &str;

    /// Token endpoint URL
    fn token_url(&self) -> &str;

    /// Default scopes requested when the configuration does not override them
    fn default_scopes(&self) -> &[&str];

    /// Separator used to join scopes into the `scope` parameter
    fn scope_separator(&self) -> &str {
        " "
    }

    /// Additional provider-specific authorization URL parameters
    fn auth_params(&self) -> Vec<(&str, &str)> {
        vec![]
    }

    /// Whether token requests carry credentials as an HTTP Basic header
    ///
    /// When true, `client_id`/`client_secret` are never placed in the
    /// request body.
    fn uses_basic_auth(&self) -> bool {
        false
    }

    /// Standard form fields excluded from the token request body
    fn token_param_exclusions(&self) -> &[&str] {
        &[]
    }

    /// Scopes in effect: the configured override or the provider defaults
    fn scopes(&self) -> Vec<String> {
        let config = self.config();
        if config.scopes.is_empty() {
            self.default_scopes().iter().map(|s| s.to_string()).collect()
        } else {
            config.scopes.clone()
        }
    }

    /// Build the authorization URL carrying the anti-forgery `state` token
    ///
    /// Pure construction; no side effects.
    fn authorization_url(&self, state: &str) -> String {
        oauth::build_authorization_url(self, state)
    }

    /// Exchange an authorization code for tokens at the token endpoint
    async fn exchange_code(&self, code: &str) -> AuthResult<TokenResponse> {
        oauth::exchange_code(self, code).await
    }

    /// Fetch the raw user profile with the given access token
    async fn fetch_user_profile(&self, access_token: &str) -> AuthResult<Value>;

    /// Map the raw provider payload into a [`NormalizedUser`]
    ///
    /// Total over any JSON object: absent optional fields become `None`,
    /// and the raw payload is preserved alongside the normalized view.
    fn normalize(&self, raw: Value) -> NormalizedUser;
}
