//! OpenID 2.0 relying-party verification
//!
//! OpenID 2.0 has no signature the relying party can check locally without
//! a pre-established shared secret, so this module runs in "dumb mode":
//! every assertion is echoed back to the identity provider in a
//! server-to-server `check_authentication` POST, and the provider's
//! plaintext reply decides whether the login stands. The trade is one
//! synchronous round trip per login for zero server-side session state.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AuthError, AuthResult};

/// OpenID 2.0 namespace URI
pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

/// Placeholder identity for identifier-select requests
pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";

/// Claimed-identity URLs carry the numeric id as the last path segment
static STEAM_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://steamcommunity\.com/openid/id/([0-9]{17,25})")
        .expect("claimed-id pattern is valid")
});

/// Rewrite `openid_`-prefixed callback keys to the dotted form
///
/// Some transports flatten the OpenID namespace separator to an
/// underscore; only the leading `openid_` is rewritten, the rest of the
/// key keeps its underscores.
pub fn normalize_openid_keys(params: &HashMap<String, String>) -> HashMap<String, String> {
    params
        .iter()
        .map(|(key, value)| {
            let key = match key.strip_prefix("openid_") {
                Some(rest) => format!("openid.{}", rest),
                None => key.clone(),
            };
            (key, value.clone())
        })
        .collect()
}

/// Signed parameters echoed back from the identity provider
///
/// Parsed once from the inbound callback, used for a single re-validation
/// POST, then discarded.
#[derive(Debug, Clone)]
pub struct OpenIdAssertion {
    /// Association handle issued by the provider
    pub assoc_handle: String,
    /// Comma-separated list of the fields the provider signed
    pub signed: String,
    /// Signature over the signed fields
    pub sig: String,
    /// Claimed-identity URL carrying the stable user id
    pub claimed_id: Option<String>,
    /// The URL the provider redirected back to
    pub return_to: Option<String>,
    /// Provider-reported error, when the assertion already failed upstream
    pub error: Option<String>,
    params: HashMap<String, String>,
}

impl OpenIdAssertion {
    /// Parse an assertion from the inbound callback parameters
    ///
    /// Keys are normalized first; the association handle, signed-field
    /// list, and signature are required, and their absence fails before
    /// any network call is made.
    pub fn from_params(params: &HashMap<String, String>) -> AuthResult<Self> {
        let params = normalize_openid_keys(params);

        let required = |key: &str| -> AuthResult<String> {
            params.get(key).cloned().ok_or_else(|| {
                AuthError::OpenIdValidation(format!(
                    "a critical openid parameter is missing from the request: {}",
                    key
                ))
            })
        };

        Ok(Self {
            assoc_handle: required("openid.assoc_handle")?,
            signed: required("openid.signed")?,
            sig: required("openid.sig")?,
            claimed_id: params.get("openid.claimed_id").cloned(),
            return_to: params.get("openid.return_to").cloned(),
            error: params.get("openid.error").cloned(),
            params,
        })
    }

    /// Form fields for the `check_authentication` POST
    ///
    /// The fixed required fields plus every field named in the signed
    /// list, echoed verbatim. Signed items are looked up with their dots
    /// flattened to underscores, matching how they arrive on the wire.
    pub fn verification_params(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = vec![
            ("openid.assoc_handle".into(), self.assoc_handle.clone()),
            ("openid.signed".into(), self.signed.clone()),
            ("openid.sig".into(), self.sig.clone()),
            ("openid.ns".into(), OPENID_NS.into()),
            ("openid.mode".into(), "check_authentication".into()),
        ];

        if let Some(error) = &self.error {
            fields.push(("openid.error".into(), error.clone()));
        }

        for item in self.signed.split(',') {
            let lookup = format!("openid.{}", item.replace('.', "_"));
            let key = format!("openid.{}", item);
            match self.params.get(&lookup) {
                Some(value) => match fields.iter_mut().find(|(k, _)| *k == key) {
                    Some(existing) => existing.1 = value.clone(),
                    None => fields.push((key, value.clone())),
                },
                // an unsigned-but-listed field that never arrived is dropped,
                // not sent as an empty pair
                None => fields.retain(|(k, _)| *k != key),
            }
        }

        fields
    }
}

/// Host allow-list check for the `return_to` URL
///
/// An empty list admits every host; otherwise the URL's host must match
/// one entry exactly.
pub fn validate_host(url: &str, allowed_hosts: &[String]) -> bool {
    if allowed_hosts.is_empty() {
        return true;
    }

    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };

    match parsed.host_str() {
        Some(host) => allowed_hosts.iter().any(|allowed| allowed == host),
        None => false,
    }
}

/// Parse the provider's plaintext response, one `key:value` pair per line
pub fn parse_key_value_response(body: &str) -> HashMap<String, String> {
    let mut parsed = HashMap::new();

    for line in body.lines() {
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            parsed.insert(key.to_string(), value.to_string());
        }
    }

    parsed
}

/// Extract the numeric identifier from a claimed-identity URL
///
/// Returns `"0"` when the URL does not match the expected pattern; the
/// identity provider signed the assertion either way, so an unparseable
/// claimed id is tolerated rather than fatal.
pub fn extract_steam_id(claimed_id: &str) -> String {
    STEAM_ID_PATTERN
        .captures(claimed_id)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| "0".to_string())
}

/// Re-validate an assertion with the identity provider
///
/// Sends the `check_authentication` POST over a server-to-server channel.
/// The Referer/Origin headers are required; the endpoint answers 403
/// without them. Success iff the reply's `is_valid` field is the literal
/// string `true`.
pub async fn check_authentication(
    client: &reqwest::Client,
    endpoint: &str,
    assertion: &OpenIdAssertion,
) -> AuthResult<()> {
    let response = client
        .post(endpoint)
        .header(reqwest::header::REFERER, "https://steamcommunity.com/")
        .header(reqwest::header::ORIGIN, "https://steamcommunity.com")
        .form(&assertion.verification_params())
        .send()
        .await?
        .error_for_status()?;

    let body = response.text().await?;
    let results = parse_key_value_response(&body);

    if results.get("is_valid").map(String::as_str) == Some("true") {
        tracing::debug!("openid assertion confirmed by provider");
        Ok(())
    } else {
        tracing::debug!(%body, "openid assertion rejected by provider");
        Err(AuthError::OpenIdValidation(
            assertion
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}
