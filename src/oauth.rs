//! Shared OAuth2 flow operations
//!
//! Implements:
//! - Authorization URL generation
//! - Token exchange (code -> tokens)
//! - Authenticated JSON fetches for profile endpoints
//!
//! These are standalone functions over [`OAuth2Provider`] rather than
//! methods on a base type; each provider picks them up through the trait's
//! default method bodies.

use std::time::Duration as StdDuration;

use serde_json::Value;

use crate::error::{AuthError, AuthResult};
use crate::provider::OAuth2Provider;
use crate::types::{OAuthErrorResponse, TokenResponse};

/// Default timeout for provider HTTP requests (30 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Create an HTTP client with sensible defaults for provider calls
pub(crate) fn create_http_client(proxy: Option<&str>) -> reqwest::Client {
    let mut builder =
        reqwest::Client::builder().timeout(StdDuration::from_secs(DEFAULT_TIMEOUT_SECS));

    if let Some(proxy) = proxy {
        if let Ok(proxy) = reqwest::Proxy::all(proxy) {
            builder = builder.proxy(proxy);
        }
    }

    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Generate the authorization URL for a provider
///
/// The output always carries `client_id`, `redirect_uri`, and the supplied
/// `state` verbatim, plus the provider's scope string and any extra
/// authorize parameters.
pub fn build_authorization_url<P: OAuth2Provider + ?Sized>(provider: &P, state: &str) -> String {
    let config = provider.config();
    let scopes = provider.scopes().join(provider.scope_separator());

    let mut url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&state={}",
        provider.auth_url(),
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(state),
    );

    if !scopes.is_empty() {
        url.push_str(&format!("&scope={}", urlencoding::encode(&scopes)));
    }

    for (key, value) in provider.auth_params() {
        url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
    }

    url
}

/// Exchange an authorization code for tokens
///
/// Credentials travel either as an HTTP Basic header or as form body
/// fields, never both. Standard body fields named by the provider's
/// exclusion list are left out.
pub async fn exchange_code<P: OAuth2Provider + ?Sized>(
    provider: &P,
    code: &str,
) -> AuthResult<TokenResponse> {
    let config = provider.config();
    let http_client = create_http_client(config.proxy.as_deref());
    let exclusions = provider.token_param_exclusions();

    let mut params: Vec<(&str, &str)> =
        vec![("grant_type", "authorization_code"), ("code", code)];

    if !exclusions.contains(&"redirect_uri") {
        params.push(("redirect_uri", config.redirect_uri.as_str()));
    }

    let request = if provider.uses_basic_auth() {
        http_client
            .post(provider.token_url())
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
    } else {
        params.push(("client_id", config.client_id.as_str()));
        params.push(("client_secret", config.client_secret.as_str()));
        http_client
            .post(provider.token_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
    };

    let response = request.send().await?;
    let status = response.status().as_u16();

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        let error: OAuthErrorResponse = serde_json::from_str(&body).unwrap_or_default();
        let message = match error.error_description {
            Some(description) => description,
            None if !error.error.is_empty() => error.error,
            None => body,
        };

        tracing::debug!(provider = provider.id(), status, "token exchange rejected");

        return Err(AuthError::TokenExchange {
            status: Some(status),
            message,
        });
    }

    response.json().await.map_err(|e| AuthError::TokenExchange {
        status: None,
        message: format!("malformed token response: {}", e),
    })
}

/// Send a request expecting a JSON response, mapping failures to
/// [`AuthError::ProfileFetch`]
pub(crate) async fn fetch_json(request: reqwest::RequestBuilder) -> AuthResult<Value> {
    let response = request.send().await?;
    let status = response.status().as_u16();

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::ProfileFetch {
            status: Some(status),
            message: body,
        });
    }

    response.json().await.map_err(|e| AuthError::ProfileFetch {
        status: None,
        message: format!("malformed profile response: {}", e),
    })
}
