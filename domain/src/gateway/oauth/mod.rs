//! OAuth authentication gateway.
//!
//! Builds the configured providers and hands them to the controllers by `ProviderKind`.

pub mod github;
pub mod vk;

use std::sync::Arc;

use log::*;
use provider_auth::http::HttpClientBuilder;
use secrecy::SecretString;
use service::config::Config;

use crate::error::Error;

pub use provider_auth::oauth::{
    AuthorizationRequest, Credentials, Profile, Provider, ProviderKind,
};

/// One provider per `ProviderKind`.
#[derive(Clone)]
pub struct Providers {
    vk: Arc<dyn Provider>,
    github: Arc<dyn Provider>,
}

impl Providers {
    pub fn new(vk: Arc<dyn Provider>, github: Arc<dyn Provider>) -> Self {
        Self { vk, github }
    }

    /// Build both providers on a shared HTTP client.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let http_client = HttpClientBuilder::new()
            .with_timeout(config.provider_request_timeout())
            .with_user_agent(format!("oauth-profiles/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let vk_credentials = credentials(
            "VK",
            config.vk_client_id(),
            config.vk_client_secret(),
            config.vk_redirect_uri(),
        )?;
        let github_credentials = credentials(
            "GitHub",
            config.github_client_id(),
            config.github_client_secret(),
            config.github_redirect_uri(),
        )?;

        let vk = vk::new_provider(config, vk_credentials, http_client.clone())?;
        let github = github::new_provider(config, github_credentials, http_client)?;

        debug!("Configured OAuth providers: vk, github");
        Ok(Self::new(Arc::new(vk), Arc::new(github)))
    }

    pub fn get(&self, kind: ProviderKind) -> Arc<dyn Provider> {
        match kind {
            ProviderKind::Vk => Arc::clone(&self.vk),
            ProviderKind::GitHub => Arc::clone(&self.github),
        }
    }
}

fn credentials(
    name: &str,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
) -> Result<Credentials, Error> {
    match (client_id, client_secret, redirect_uri) {
        (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(Credentials {
            client_id,
            client_secret: SecretString::new(client_secret),
            redirect_uri,
        }),
        _ => Err(Error::config(&format!("{name} OAuth credentials are not configured"))),
    }
}
