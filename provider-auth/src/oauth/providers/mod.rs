//! Provider implementations.

pub mod github;
pub mod vk;

/// Join a configured base URL and an endpoint path.
fn endpoint(base: &str, path: &str) -> Result<url::Url, crate::Error> {
    Ok(url::Url::parse(&format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))?)
}
