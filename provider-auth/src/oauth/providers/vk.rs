//! VK OAuth provider implementation.

use async_trait::async_trait;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::endpoint;
use crate::error::{api_error, ApiErrorKind, Error, ErrorKind};
use crate::oauth::token::decode_token_response;
use crate::oauth::{
    AuthorizationRequest, Credentials, Profile, ProfileField, ProviderKind, VkProfile,
};

/// VK API version every method call is pinned to.
pub const API_VERSION: &str = "5.199";

/// Scope requested at authorization.
const SCOPE: &str = "email";

/// Base URLs of the VK OAuth server and API.
#[derive(Debug, Clone)]
pub struct Urls {
    pub oauth_url: String,
    pub api_url: String,
}

impl Default for Urls {
    fn default() -> Self {
        Self {
            oauth_url: "https://oauth.vk.com".to_string(),
            api_url: "https://api.vk.com".to_string(),
        }
    }
}

/// Envelope of every VK API method response.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    response: Option<T>,
    error: Option<ApiFailure>,
}

#[derive(Debug, Deserialize)]
struct ApiFailure {
    error_code: i64,
    error_msg: String,
}

/// An entry of the `users.get` response.
#[derive(Debug, Deserialize)]
struct User {
    first_name: String,
    last_name: String,
}

/// The `account.getProfileInfo` response. Users may hide any of these fields.
#[derive(Debug, Default, Deserialize)]
struct ProfileInfo {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    bdate: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// VK OAuth provider.
pub struct Provider {
    credentials: Credentials,
    authorize_url: url::Url,
    token_url: url::Url,
    api_url: String,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new VK provider. Fails if the configured base URLs are not valid URLs.
    pub fn new(
        credentials: Credentials,
        urls: Urls,
        http_client: reqwest::Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            credentials,
            authorize_url: endpoint(&urls.oauth_url, "authorize")?,
            token_url: endpoint(&urls.oauth_url, "access_token")?,
            api_url: endpoint(&urls.api_url, "method")?.to_string(),
            http_client,
        })
    }

    /// Call a VK API method and unwrap its `response` envelope.
    async fn call_method<T: DeserializeOwned>(
        &self,
        method: &str,
        access_token: &str,
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), method);
        let body = self
            .http_client
            .get(&url)
            .query(&[("access_token", access_token), ("v", API_VERSION)])
            .send()
            .await
            .inspect_err(|e| warn!("VK {method} request failed: {e:?}"))?
            .text()
            .await?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse VK {method} response: {e:?}");
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Api(ApiErrorKind::InvalidResponse),
            }
        })?;

        match envelope {
            ApiEnvelope {
                response: Some(response),
                ..
            } => Ok(response),
            ApiEnvelope {
                error: Some(failure),
                ..
            } => {
                warn!(
                    "VK {method} returned error {}: {}",
                    failure.error_code, failure.error_msg
                );
                Err(api_error(ApiErrorKind::Rejected, &failure.error_msg))
            }
            _ => Err(api_error(
                ApiErrorKind::InvalidResponse,
                &format!("VK {method} returned neither response nor error"),
            )),
        }
    }
}

/// Shape the two VK API payloads into the displayed profile.
fn build_profile(user: &User, info: ProfileInfo) -> VkProfile {
    VkProfile {
        user_name: format!("{} {}", user.first_name, user.last_name),
        fields: vec![
            ProfileField::new("ID", info.id.map(|id| id.to_string())),
            ProfileField::new("Birth date", info.bdate),
            ProfileField::new("First name", info.first_name),
            ProfileField::new("Last name", info.last_name),
        ],
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Vk
    }

    fn authorization_url(&self, state: &str) -> AuthorizationRequest {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", &self.credentials.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPE)
            .append_pair("display", "page")
            .append_pair("state", state);

        AuthorizationRequest {
            url: url.into(),
            state: state.to_string(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<SecretString, Error> {
        debug!("Exchanging VK OAuth code for an access token");

        let response = self
            .http_client
            .get(self.token_url.clone())
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                (
                    "client_secret",
                    self.credentials.client_secret.expose_secret().as_str(),
                ),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .inspect_err(|e| warn!("Failed to exchange VK OAuth code: {e:?}"))?;

        let body = response.text().await?;
        let token = decode_token_response(&body)
            .inspect_err(|e| warn!("VK token exchange failed: {}", e.description()))?;

        info!("Successfully exchanged VK OAuth code for an access token");
        Ok(token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, Error> {
        let users: Vec<User> = self.call_method("users.get", access_token).await?;
        let user = users.first().ok_or_else(|| {
            api_error(
                ApiErrorKind::InvalidResponse,
                "VK users.get returned no users",
            )
        })?;

        let info: ProfileInfo = self
            .call_method("account.getProfileInfo", access_token)
            .await?;

        Ok(Profile::Vk(build_profile(user, info)))
    }
}
