//! Social login provider adapters
//!
//! Each adapter maps one identity provider's authorization endpoint, token
//! endpoint, and user-info endpoint into a [`NormalizedUser`]. The
//! embedding application owns session state, CSRF `state` generation, and
//! callback routing; the adapters own the provider wire contracts and
//! nothing else.
//!
//! OAuth2 providers implement [`OAuth2Provider`]; the Steam adapter is an
//! OpenID 2.0 relying party with its own three-stage flow (see
//! [`providers::Steam`] and [`openid`]).
//!
//! # Example
//!
//! ```no_run
//! use social_auth::providers::Gitee;
//! use social_auth::{OAuth2Provider, ProviderConfig};
//!
//! # async fn callback(code: &str) -> social_auth::AuthResult<()> {
//! let config = ProviderConfig::new("client-id", "client-secret", "https://example.com/callback");
//! let provider = Gitee::new(config);
//!
//! let tokens = provider.exchange_code(code).await?;
//! let raw = provider.fetch_user_profile(&tokens.access_token).await?;
//! let user = provider.normalize(raw);
//! # let _ = user;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod oauth;
pub mod openid;
pub mod provider;
pub mod providers;
pub mod types;

pub use config::ProviderConfig;
pub use error::{AuthError, AuthResult};
pub use provider::OAuth2Provider;
pub use types::{NormalizedUser, TokenResponse};
