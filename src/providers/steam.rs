//! Steam provider
//!
//! Steam does not speak OAuth2; it acts as an OpenID 2.0 identity provider
//! and this adapter is the relying party. The flow is stateless across the
//! authentication attempt: correlation is carried by the provider's
//! redirect, not by server-side session, and every callback is re-validated
//! with a synchronous `check_authentication` round trip (see
//! [`crate::openid`]). The profile lookup needs a Steam Web API key, which
//! is supplied as the configured client secret.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{AuthError, AuthResult};
use crate::oauth::{create_http_client, fetch_json};
use crate::openid::{self, OpenIdAssertion, IDENTIFIER_SELECT, OPENID_NS};
use crate::types::{json_string, NormalizedUser};

/// Steam OpenID 2.0 login endpoint
pub const OPENID_URL: &str = "https://steamcommunity.com/openid/login";

const PLAYER_SUMMARIES_PATH: &str = "/ISteamUser/GetPlayerSummaries/v0002/";

/// Steam OpenID provider
#[derive(Debug)]
pub struct Steam {
    config: ProviderConfig,
    openid_url: String,
    player_summaries_url: String,
}

impl Steam {
    /// Create a Steam adapter
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            openid_url: OPENID_URL.to_string(),
            player_summaries_url: format!("http://api.steampowered.com{}", PLAYER_SUMMARIES_PATH),
        }
    }

    /// Point both endpoints at `base` (used by tests)
    pub fn base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.openid_url = format!("{}/openid/login", base);
        self.player_summaries_url = format!("{}{}", base, PLAYER_SUMMARIES_PATH);
        self
    }

    /// Provider identifier
    pub fn id(&self) -> &str {
        "steam"
    }

    /// Human-readable provider name
    pub fn display_name(&self) -> &str {
        "Steam"
    }

    /// The configuration this adapter was constructed with
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Realm sent to the provider: scheme + host, no path
    fn realm(&self) -> AuthResult<String> {
        let redirect = url::Url::parse(&self.config.redirect_uri).map_err(|e| {
            AuthError::Configuration(format!("invalid redirect_uri: {}", e))
        })?;

        let host = match &self.config.realm {
            Some(realm) => realm.clone(),
            None => redirect
                .host_str()
                .ok_or_else(|| {
                    AuthError::Configuration("redirect_uri has no host".to_string())
                })?
                .to_string(),
        };

        let scheme = if self.config.force_https {
            "https"
        } else {
            redirect.scheme()
        };

        Ok(format!("{}://{}", scheme, host))
    }

    /// Build the indirect-identifier login URL
    ///
    /// Pure construction; the anti-forgery correlation for this flow rides
    /// in the provider's signed `return_to` echo rather than a `state`
    /// parameter.
    pub fn authorization_url(&self) -> AuthResult<String> {
        let realm = self.realm()?;

        let params = [
            ("openid.ns", OPENID_NS),
            ("openid.mode", "checkid_setup"),
            ("openid.return_to", self.config.redirect_uri.as_str()),
            ("openid.realm", realm.as_str()),
            ("openid.identity", IDENTIFIER_SELECT),
            ("openid.claimed_id", IDENTIFIER_SELECT),
        ];

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!("{}?{}", self.openid_url, query))
    }

    /// Validate the OpenID callback and return the asserted Steam id
    ///
    /// Required-field and allowed-host checks run before any network call;
    /// the assertion is then re-validated with the provider. Returns `"0"`
    /// when the claimed id does not carry a parseable identifier.
    pub async fn validate(&self, params: &HashMap<String, String>) -> AuthResult<String> {
        let assertion = OpenIdAssertion::from_params(params)?;

        let return_to = assertion.return_to.as_deref().unwrap_or_default();
        if !openid::validate_host(return_to, &self.config.allowed_hosts) {
            return Err(AuthError::OpenIdValidation(
                "invalid return_to host".to_string(),
            ));
        }

        let client = create_http_client(self.config.proxy.as_deref());
        openid::check_authentication(&client, &self.openid_url, &assertion).await?;

        Ok(assertion
            .claimed_id
            .as_deref()
            .map(openid::extract_steam_id)
            .unwrap_or_else(|| "0".to_string()))
    }

    /// Fetch the player summary for a validated Steam id
    pub async fn fetch_user_profile(&self, steam_id: &str) -> AuthResult<Value> {
        if self.config.client_secret.is_empty() {
            return Err(AuthError::Configuration(
                "the Steam API key has not been specified".to_string(),
            ));
        }

        let client = create_http_client(self.config.proxy.as_deref());

        let payload = fetch_json(client.get(&self.player_summaries_url).query(&[
            ("key", self.config.client_secret.as_str()),
            ("steamids", steam_id),
        ]))
        .await?;

        Ok(payload
            .pointer("/response/players/0")
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Map a player summary into a [`NormalizedUser`]
    pub fn normalize(&self, raw: Value) -> NormalizedUser {
        NormalizedUser {
            id: json_string(&raw, "steamid").unwrap_or_default(),
            nickname: json_string(&raw, "personaname"),
            name: json_string(&raw, "realname"),
            email: None,
            avatar: json_string(&raw, "avatarmedium"),
            raw,
        }
    }

    /// Full callback pipeline: re-validate, fetch the profile, normalize
    pub async fn authenticate(
        &self,
        params: &HashMap<String, String>,
    ) -> AuthResult<NormalizedUser> {
        let steam_id = self.validate(params).await?;
        let raw = self.fetch_user_profile(&steam_id).await?;
        Ok(self.normalize(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ProviderConfig {
        ProviderConfig::new("client-id", "steam-api-key", "https://example.com/auth/callback")
    }

    #[test]
    fn test_authorization_url_params() {
        let provider = Steam::new(config());
        let url = provider.authorization_url().unwrap();

        assert!(url.starts_with("https://steamcommunity.com/openid/login?"));
        assert!(url.contains("openid.mode=checkid_setup"));
        assert!(url.contains(&format!("openid.ns={}", urlencoding::encode(OPENID_NS))));
        assert!(url.contains("openid.realm=https%3A%2F%2Fexample.com"));
        assert!(url.contains("openid.return_to=https%3A%2F%2Fexample.com%2Fauth%2Fcallback"));
        assert_eq!(url.matches("identifier_select").count(), 2);
    }

    #[test]
    fn test_realm_from_config_override() {
        let provider = Steam::new(config().with_realm("login.example.org"));
        let url = provider.authorization_url().unwrap();

        assert!(url.contains("openid.realm=https%3A%2F%2Flogin.example.org"));
    }

    #[test]
    fn test_realm_force_https() {
        let provider = Steam::new(
            ProviderConfig::new("id", "key", "http://example.com/cb").with_force_https(true),
        );
        let url = provider.authorization_url().unwrap();

        assert!(url.contains("openid.realm=https%3A%2F%2Fexample.com"));
        // return_to keeps the configured scheme
        assert!(url.contains("openid.return_to=http%3A%2F%2Fexample.com%2Fcb"));
    }

    #[test]
    fn test_realm_keeps_http_scheme() {
        let provider = Steam::new(ProviderConfig::new("id", "key", "http://example.com/cb"));
        let url = provider.authorization_url().unwrap();

        assert!(url.contains("openid.realm=http%3A%2F%2Fexample.com"));
    }

    #[test]
    fn test_invalid_redirect_uri() {
        let provider = Steam::new(ProviderConfig::new("id", "key", "not a url"));

        assert!(matches!(
            provider.authorization_url(),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_normalize() {
        let provider = Steam::new(config());
        let user = provider.normalize(json!({
            "steamid": "76561197960287930",
            "personaname": "ada",
            "realname": "Ada Lovelace",
            "avatarmedium": "https://avatars.example.com/ada_medium.jpg"
        }));

        assert_eq!(user.id, "76561197960287930");
        assert_eq!(user.nickname.as_deref(), Some("ada"));
        assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            user.avatar.as_deref(),
            Some("https://avatars.example.com/ada_medium.jpg")
        );
        assert!(user.email.is_none());
    }

    #[test]
    fn test_normalize_without_realname() {
        let provider = Steam::new(config());
        let user = provider.normalize(json!({
            "steamid": "76561197960287930",
            "personaname": "ada"
        }));

        assert_eq!(user.id, "76561197960287930");
        assert!(user.name.is_none());
        assert!(user.avatar.is_none());
    }

    #[tokio::test]
    async fn test_profile_requires_api_key() {
        let provider = Steam::new(ProviderConfig::new("client-id", "", "https://example.com/cb"));

        let err = provider
            .fetch_user_profile("76561197960287930")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }
}
