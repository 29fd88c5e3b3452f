//! GitHub OAuth provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use log::*;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::endpoint;
use crate::error::{api_error, ApiErrorKind, Error, ErrorKind};
use crate::oauth::token::decode_token_response;
use crate::oauth::{AuthorizationRequest, Credentials, GitHubProfile, Profile, ProviderKind};

/// Scope requested at authorization.
const SCOPE: &str = "user";

/// Default bound on the code exchange call.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URLs of the GitHub OAuth server and REST API.
#[derive(Debug, Clone)]
pub struct Urls {
    pub oauth_url: String,
    pub api_url: String,
}

impl Default for Urls {
    fn default() -> Self {
        Self {
            oauth_url: "https://github.com".to_string(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

/// Form body of the code exchange request
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

/// Error body of the REST API, e.g. `{"message": "Bad credentials"}`
#[derive(Debug, Deserialize)]
struct ApiFailure {
    message: String,
}

/// GitHub OAuth provider.
pub struct Provider {
    credentials: Credentials,
    authorize_url: url::Url,
    token_url: url::Url,
    user_url: url::Url,
    exchange_timeout: Duration,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new GitHub provider. Fails if the configured base URLs are not valid URLs.
    pub fn new(
        credentials: Credentials,
        urls: Urls,
        http_client: reqwest::Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            credentials,
            authorize_url: endpoint(&urls.oauth_url, "login/oauth/authorize")?,
            token_url: endpoint(&urls.oauth_url, "login/oauth/access_token")?,
            user_url: endpoint(&urls.api_url, "user")?,
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
            http_client,
        })
    }

    /// Override the bound on the code exchange call.
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn authorization_url(&self, state: &str) -> AuthorizationRequest {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", &self.credentials.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPE)
            .append_pair("state", state);

        AuthorizationRequest {
            url: url.into(),
            state: state.to_string(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<SecretString, Error> {
        let request = TokenExchangeRequest {
            client_id: &self.credentials.client_id,
            client_secret: self.credentials.client_secret.expose_secret(),
            code,
            redirect_uri: &self.credentials.redirect_uri,
        };

        debug!("Exchanging GitHub OAuth code for an access token");

        let response = self
            .http_client
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .timeout(self.exchange_timeout)
            .form(&request)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to exchange GitHub OAuth code: {e:?}"))?;

        let body = response.text().await?;
        let token = decode_token_response(&body)
            .inspect_err(|e| warn!("GitHub token exchange failed: {}", e.description()))?;

        info!("Successfully exchanged GitHub OAuth code for an access token");
        Ok(token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, Error> {
        let response = self
            .http_client
            .get(self.user_url.clone())
            .bearer_auth(access_token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .inspect_err(|e| warn!("Failed to get GitHub user info: {e:?}"))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiFailure>(&body)
                .map(|failure| failure.message)
                .unwrap_or_else(|_| format!("GitHub answered {status}"));
            warn!("GitHub user info error: {message}");
            return Err(api_error(ApiErrorKind::Rejected, &message));
        }

        let profile: GitHubProfile = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse GitHub user info: {e:?}");
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Api(ApiErrorKind::InvalidResponse),
            }
        })?;

        Ok(Profile::GitHub(profile))
    }
}
