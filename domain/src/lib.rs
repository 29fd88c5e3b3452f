//! Sign-in flows and session state of the OAuth profile viewer.
//!
//! `web` only talks to this crate; provider HTTP calls live in `provider-auth` and are reached
//! through the `gateway` module. The types a controller needs are re-exported here so that `web`
//! does not have to depend on `provider-auth` directly.

pub use provider_auth::oauth::{
    GitHubProfile, Profile, ProfileField, ProviderKind, VkProfile, NOT_SPECIFIED,
};

pub mod error;
pub mod gateway;
pub mod oauth_flow;
pub mod session_tokens;
