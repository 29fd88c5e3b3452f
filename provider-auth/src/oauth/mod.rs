//! OAuth 2.0 authorization-code grant infrastructure.

mod profile;
mod provider;
mod state;
mod token;

pub mod providers;

pub use profile::{GitHubProfile, Profile, ProfileField, VkProfile, NOT_SPECIFIED};
pub use provider::{AuthorizationRequest, Credentials, Provider, ProviderKind};
pub use state::{generate_state, states_match};
