//! OAuth provider trait and types.

use std::fmt;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::Profile;
use crate::error::Error;

/// OAuth providers a user can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "vk")]
    Vk,
    #[serde(rename = "github")]
    GitHub,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Vk, ProviderKind::GitHub];

    /// Get the provider identifier string, as used in routes.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Vk => "vk",
            ProviderKind::GitHub => "github",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client credentials registered with a provider.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

/// Authorization request with the URL to send the browser to.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// CSRF state parameter embedded in `url`.
    pub state: String,
}

/// One provider's side of the authorization-code grant.
///
/// Every implementation decodes the token endpoint response through the same typed path, so
/// a provider rejection, a response without a token, and a transport failure surface as the
/// same error kinds whichever provider is involved.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Build the URL of the provider's consent page for the given CSRF `state`.
    fn authorization_url(&self, state: &str) -> AuthorizationRequest;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<SecretString, Error>;

    /// Fetch the profile shown to a signed in user.
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, Error>;
}
