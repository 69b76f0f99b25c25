//! Adapter error types

use thiserror::Error;

/// Errors surfaced by the provider adapters
///
/// Every operation fails fast with a specific kind; no adapter retries or
/// silently recovers. The only documented degradation is a secondary
/// profile lookup (e.g. an email endpoint) falling back to a null field.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required configuration value is missing or empty
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or HTTP-layer failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Token endpoint returned a non-2xx status or a malformed body
    #[error("Token exchange failed: {message}")]
    TokenExchange {
        /// HTTP status of the rejection, when one was received
        status: Option<u16>,
        /// Provider error description or raw body
        message: String,
    },

    /// Profile endpoint returned a non-2xx status or a malformed body
    #[error("Profile fetch failed: {message}")]
    ProfileFetch {
        /// HTTP status of the rejection, when one was received
        status: Option<u16>,
        /// Provider error description or raw body
        message: String,
    },

    /// OpenID callback failed validation
    #[error("Failed to validate OpenID login: {0}")]
    OpenIdValidation(String),

    /// A signed identity token was rejected (issuer mismatch, expiry, bad subject)
    #[error("Identity assertion rejected: {0}")]
    IdentityAssertion(String),
}

/// Result type for adapter operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Transport("request timed out".to_string())
        } else if err.is_connect() {
            AuthError::Transport(format!("connection failed: {}", err))
        } else {
            AuthError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::Configuration("the Zendesk subdomain has not been specified".into());
        assert!(err.to_string().contains("subdomain"));

        let err = AuthError::TokenExchange {
            status: Some(400),
            message: "invalid_grant".into(),
        };
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_openid_validation_display() {
        let err = AuthError::OpenIdValidation("unknown error".into());
        assert_eq!(
            err.to_string(),
            "Failed to validate OpenID login: unknown error"
        );
    }
}
