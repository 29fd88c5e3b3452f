//! # provider-auth
//!
//! Client side of the OAuth 2.0 authorization-code grant for the providers this
//! application signs users in with:
//! - HTTP client building for outbound provider calls
//! - The `Provider` trait and its VK and GitHub implementations
//! - Typed token-endpoint and profile responses
//! - CSRF state generation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use provider_auth::{
//!     http::HttpClientBuilder,
//!     oauth::{providers::github, Credentials, Provider},
//! };
//!
//! let client = HttpClientBuilder::new().build()?;
//! let github = github::Provider::new(credentials, github::Urls::default(), client)?;
//! let request = github.authorization_url(&provider_auth::oauth::generate_state());
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
