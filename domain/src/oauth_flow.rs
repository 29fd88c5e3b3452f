//! The authorization-code grant as seen from one browser session.
//!
//! Per provider a session is either anonymous or authenticated (a token is stored). Login sends
//! an anonymous session to the provider's consent page, the callback exchanges the returned
//! code for a token, and once a token is stored the callback shows the profile instead.

use log::*;
use provider_auth::oauth::{
    generate_state, states_match, AuthorizationRequest, Profile, Provider, ProviderKind,
};
use serde::{Deserialize, Serialize};

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InputErrorKind};
use crate::session_tokens::TokenRepository;

/// Which provider tokens the session holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoginStatus {
    pub vk_logged_in: bool,
    pub github_logged_in: bool,
}

#[derive(Debug)]
pub enum LoginOutcome {
    /// A token is already stored, so the profile can be shown without a provider round trip.
    AlreadyAuthenticated,
    /// Send the browser to the provider's consent page.
    Redirect(AuthorizationRequest),
}

/// Query string the provider appends to the callback URL.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user declines consent.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug)]
pub enum CallbackOutcome {
    Profile(Profile),
    /// The code was exchanged and the token stored; the callback should be visited again.
    Authenticated,
}

pub async fn login_status(tokens: &dyn TokenRepository) -> Result<LoginStatus, Error> {
    Ok(LoginStatus {
        vk_logged_in: tokens.is_authenticated(ProviderKind::Vk).await?,
        github_logged_in: tokens.is_authenticated(ProviderKind::GitHub).await?,
    })
}

pub async fn login(
    provider: &dyn Provider,
    tokens: &dyn TokenRepository,
) -> Result<LoginOutcome, Error> {
    let kind = provider.provider();
    if tokens.is_authenticated(kind).await? {
        debug!("Session already holds a {kind} token, skipping authorization");
        return Ok(LoginOutcome::AlreadyAuthenticated);
    }

    let state = generate_state();
    tokens.store_state(kind, &state).await?;

    info!("Redirecting session to {kind} authorization");
    Ok(LoginOutcome::Redirect(provider.authorization_url(&state)))
}

pub async fn callback(
    provider: &dyn Provider,
    tokens: &dyn TokenRepository,
    params: CallbackParams,
) -> Result<CallbackOutcome, Error> {
    let kind = provider.provider();

    if let Some(access_token) = tokens.token(kind).await? {
        debug!("Fetching {kind} profile for an authenticated session");
        let profile = provider
            .fetch_profile(&access_token)
            .await
            .inspect_err(|e| warn!("Failed to fetch {kind} profile: {e:?}"))?;
        return Ok(CallbackOutcome::Profile(profile));
    }

    if let Some(error) = params.error {
        tokens.take_state(kind).await?;
        let description = params
            .error_description
            .filter(|d| !d.is_empty())
            .unwrap_or(error);
        warn!("{kind} authorization was declined: {description}");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Rejected(description)),
        });
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::input(InputErrorKind::MissingCode))?;

    let expected_state = tokens.take_state(kind).await?;
    if !states_match(expected_state.as_deref(), params.state.as_deref()) {
        warn!("Rejecting {kind} callback with an unknown state");
        return Err(Error::input(InputErrorKind::InvalidState));
    }

    let access_token = provider.exchange_code(&code).await?;
    tokens.store_token(kind, &access_token).await?;

    info!("Stored {kind} access token in session");
    Ok(CallbackOutcome::Authenticated)
}

pub async fn logout(kind: ProviderKind, tokens: &dyn TokenRepository) -> Result<(), Error> {
    tokens.clear_token(kind).await?;
    tokens.take_state(kind).await?;
    info!("Cleared {kind} token from session");
    Ok(())
}
