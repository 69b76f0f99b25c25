//! EVE Online OAuth provider
//!
//! The access token is itself a signed JWT carrying the character claims,
//! so there is no separate profile endpoint: the token is verified against
//! the login server's published key set and its claims become the user
//! record. Issuer and expiry failures are authentication failures, not
//! transport failures.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{AuthError, AuthResult};
use crate::oauth::{create_http_client, fetch_json};
use crate::provider::OAuth2Provider;
use crate::types::{json_string, NormalizedUser};

/// Tranquility login server, also accepted as a bare-host issuer
const TRANQUILITY_ENDPOINT: &str = "https://login.eveonline.com";

const CHARACTER_PREFIX: &str = "CHARACTER:EVE:";

/// Published RSA key set
#[derive(Debug, Deserialize)]
struct JwksKeySet {
    keys: Vec<JwksKey>,
}

#[derive(Debug, Deserialize)]
struct JwksKey {
    #[serde(default)]
    kid: String,
    #[serde(default)]
    n: String,
    #[serde(default)]
    e: String,
}

impl JwksKeySet {
    fn find_key(&self, kid: &str) -> Option<&JwksKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// EVE Online OAuth provider
#[derive(Debug)]
pub struct Eveonline {
    config: ProviderConfig,
    auth_url: String,
    token_url: String,
    jwks_url: String,
}

impl Eveonline {
    /// Create an EVE Online adapter
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            auth_url: "https://login.eveonline.com/v2/oauth/authorize/".to_string(),
            token_url: "https://login.eveonline.com/v2/oauth/token".to_string(),
            jwks_url: "https://login.eveonline.com/oauth/jwks".to_string(),
        }
    }

    /// Point every endpoint at `base` (used by tests)
    pub fn base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/v2/oauth/authorize/", base);
        self.token_url = format!("{}/v2/oauth/token", base);
        self.jwks_url = format!("{}/oauth/jwks", base);
        self
    }

    /// Verify the signed access token and return its claims
    ///
    /// Signature is checked against the key set published by the login
    /// server; issuer and expiry are then validated explicitly.
    pub async fn verify(&self, jwt: &str) -> AuthResult<Value> {
        let client = create_http_client(self.config.proxy.as_deref());

        let jwks: JwksKeySet = serde_json::from_value(fetch_json(client.get(&self.jwks_url)).await?)
            .map_err(|e| AuthError::ProfileFetch {
                status: None,
                message: format!("malformed JWKS response: {}", e),
            })?;

        let header = decode_header(jwt).map_err(|e| {
            AuthError::IdentityAssertion(format!("failed to decode token header: {}", e))
        })?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::IdentityAssertion("token header has no kid".to_string()))?;
        let key = jwks.find_key(&kid).ok_or_else(|| {
            AuthError::IdentityAssertion(format!("no published key matches kid {}", kid))
        })?;

        let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
            .map_err(|e| AuthError::IdentityAssertion(format!("invalid RSA key: {}", e)))?;

        // claims are checked explicitly below
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Value>(jwt, &decoding_key, &validation)
            .map_err(|e| AuthError::IdentityAssertion(format!("token signature rejected: {}", e)))?;

        let claims = data.claims;
        verify_claims(&claims, Utc::now().timestamp())?;
        character_id(claims["sub"].as_str().unwrap_or_default())?;

        tracing::debug!("access token verified against published key set");

        Ok(claims)
    }
}

/// Issuer and expiry checks, separated from the signature path
fn verify_claims(claims: &Value, now: i64) -> AuthResult<()> {
    let issuer = claims["iss"].as_str().unwrap_or_default();
    if issuer != "login.eveonline.com" && issuer != TRANQUILITY_ENDPOINT {
        return Err(AuthError::IdentityAssertion(
            "access token issuer mismatch".to_string(),
        ));
    }

    let expires = claims["exp"].as_i64().unwrap_or(0);
    if expires <= now {
        return Err(AuthError::IdentityAssertion(
            "access token is expired".to_string(),
        ));
    }

    Ok(())
}

/// Character id from the subject claim
fn character_id(sub: &str) -> AuthResult<String> {
    sub.strip_prefix(CHARACTER_PREFIX)
        .map(str::to_string)
        .ok_or_else(|| {
            AuthError::IdentityAssertion(format!("unexpected subject format: {}", sub))
        })
}

#[async_trait]
impl OAuth2Provider for Eveonline {
    fn id(&self) -> &str {
        "eveonline"
    }

    fn display_name(&self) -> &str {
        "EVE Online"
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

    fn token_param_exclusions(&self) -> &[&str] {
        &["redirect_uri"]
    }

    async fn fetch_user_profile(&self, access_token: &str) -> AuthResult<Value> {
        self.verify(access_token).await
    }

    fn normalize(&self, raw: Value) -> NormalizedUser {
        let id = raw["sub"]
            .as_str()
            .and_then(|sub| sub.strip_prefix(CHARACTER_PREFIX))
            .unwrap_or_default()
            .to_string();

        NormalizedUser {
            id,
            name: json_string(&raw, "name"),
            nickname: None,
            email: None,
            avatar: None,
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> Eveonline {
        Eveonline::new(ProviderConfig::new(
            "client-id",
            "client-secret",
            "https://example.com/callback",
        ))
    }

    fn valid_claims(now: i64) -> Value {
        json!({
            "iss": "login.eveonline.com",
            "exp": now + 1200,
            "sub": "CHARACTER:EVE:2114794365",
            "name": "Ada Lovelace",
            "owner": "8PmzCeTKb4VFUDrHLc/AeZXDSWM="
        })
    }

    #[test]
    fn test_eveonline_provider() {
        let provider = provider();

        assert_eq!(provider.id(), "eveonline");
        assert!(provider.auth_url().contains("login.eveonline.com"));
        assert!(provider.uses_basic_auth());
        assert!(provider.token_param_exclusions().contains(&"redirect_uri"));
    }

    #[test]
    fn test_verify_claims_ok() {
        let now = 1_700_000_000;
        assert!(verify_claims(&valid_claims(now), now).is_ok());
    }

    #[test]
    fn test_verify_claims_https_issuer() {
        let now = 1_700_000_000;
        let mut claims = valid_claims(now);
        claims["iss"] = json!("https://login.eveonline.com");

        assert!(verify_claims(&claims, now).is_ok());
    }

    #[test]
    fn test_verify_claims_issuer_mismatch_wins_over_expiry() {
        let now = 1_700_000_000;
        let mut claims = valid_claims(now);
        claims["iss"] = json!("https://login.evil.example.com");
        claims["exp"] = json!(now + 1200);

        let err = verify_claims(&claims, now).unwrap_err();
        assert!(err.to_string().contains("issuer mismatch"));

        // still an issuer error when the token is also expired
        claims["exp"] = json!(now - 1200);
        let err = verify_claims(&claims, now).unwrap_err();
        assert!(err.to_string().contains("issuer mismatch"));
    }

    #[test]
    fn test_verify_claims_expired_one_second_ago() {
        let now = 1_700_000_000;
        let mut claims = valid_claims(now);
        claims["exp"] = json!(now - 1);

        let err = verify_claims(&claims, now).unwrap_err();
        assert!(matches!(err, AuthError::IdentityAssertion(_)));
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_verify_claims_expiry_is_strict() {
        let now = 1_700_000_000;
        let mut claims = valid_claims(now);
        claims["exp"] = json!(now);

        assert!(verify_claims(&claims, now).is_err());
    }

    #[test]
    fn test_character_id_strips_prefix() {
        assert_eq!(
            character_id("CHARACTER:EVE:2114794365").unwrap(),
            "2114794365"
        );
    }

    #[test]
    fn test_character_id_rejects_other_subjects() {
        let err = character_id("AGENT:EVE:12345").unwrap_err();
        assert!(matches!(err, AuthError::IdentityAssertion(_)));

        assert!(character_id("").is_err());
    }

    #[test]
    fn test_normalize() {
        let now = 1_700_000_000;
        let user = provider().normalize(valid_claims(now));

        assert_eq!(user.id, "2114794365");
        assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
        assert!(user.email.is_none());
        assert_eq!(user.raw["owner"], "8PmzCeTKb4VFUDrHLc/AeZXDSWM=");
    }
}
