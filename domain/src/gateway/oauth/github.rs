//! GitHub OAuth client.

use provider_auth::oauth::providers::github::{Provider as GitHubProvider, Urls};
use provider_auth::oauth::Credentials;
use service::config::Config;

use crate::error::Error;

/// Create a GitHub provider whose code exchange is bounded by
/// `GITHUB_EXCHANGE_TIMEOUT_SECS`.
pub fn new_provider(
    config: &Config,
    credentials: Credentials,
    http_client: reqwest::Client,
) -> Result<GitHubProvider, Error> {
    let urls = Urls {
        oauth_url: config.github_oauth_url().to_string(),
        api_url: config.github_api_url().to_string(),
    };
    Ok(GitHubProvider::new(credentials, urls, http_client)?
        .with_exchange_timeout(config.github_exchange_timeout()))
}
