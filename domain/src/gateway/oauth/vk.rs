//! VK OAuth client.

use provider_auth::oauth::providers::vk::{Provider as VkProvider, Urls};
use provider_auth::oauth::Credentials;
use service::config::Config;

use crate::error::Error;

/// Create a VK provider from the configured credentials and endpoints.
///
/// ```rust,ignore
/// let provider = vk::new_provider(&config, credentials, http_client)?;
/// ```
pub fn new_provider(
    config: &Config,
    credentials: Credentials,
    http_client: reqwest::Client,
) -> Result<VkProvider, Error> {
    let urls = Urls {
        oauth_url: config.vk_oauth_url().to_string(),
        api_url: config.vk_api_url().to_string(),
    };
    Ok(VkProvider::new(credentials, urls, http_client)?)
}
