//! Per-provider configuration
//!
//! Configuration is supplied externally and passed into each adapter's
//! constructor; adapters never consult process-wide state. The extra keys
//! (`subdomain`, `realm`, `proxy`, `allowed_hosts`, `force_https`) are only
//! read by the providers that document them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Static configuration for one provider
///
/// Immutable once constructed. The `client_secret` doubles as the
/// provider-issued API key for providers that authenticate profile lookups
/// with a key instead of an OAuth token.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret (or provider API key)
    pub client_secret: String,
    /// Redirect URI for the provider callback
    pub redirect_uri: String,
    /// Scope override; empty means the provider defaults apply
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Account subdomain substituted into endpoint URLs
    #[serde(default)]
    pub subdomain: Option<String>,
    /// OpenID realm host override
    #[serde(default)]
    pub realm: Option<String>,
    /// Proxy URL for outbound provider calls
    #[serde(default)]
    pub proxy: Option<String>,
    /// Hosts permitted in the OpenID `return_to` URL; empty admits any host
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    /// Force the `https` scheme on the OpenID realm
    #[serde(default)]
    pub force_https: bool,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("subdomain", &self.subdomain)
            .field("realm", &self.realm)
            .field("proxy", &self.proxy)
            .field("allowed_hosts", &self.allowed_hosts)
            .field("force_https", &self.force_https)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration with the three values every provider requires
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            subdomain: None,
            realm: None,
            proxy: None,
            allowed_hosts: Vec::new(),
            force_https: false,
        }
    }

    /// Override the provider's default scopes
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the account subdomain
    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    /// Set the OpenID realm host
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Set a proxy for outbound provider calls
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Restrict the hosts accepted in the OpenID `return_to` URL
    pub fn with_allowed_hosts(
        mut self,
        hosts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Force the `https` scheme on the OpenID realm
    pub fn with_force_https(mut self, force_https: bool) -> Self {
        self.force_https = force_https;
        self
    }
}
