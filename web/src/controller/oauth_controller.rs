//! Controller for the OAuth sign-in flows.
//!
//! Every route is parameterized by the provider path segment (`vk` or `github`). These endpoints
//! are reached by browser navigation, so results are redirects or a JSON profile view.

use crate::controller::ApiResponse;
use crate::extractors::session_tokens::Tokens;
use crate::{AppState, Error};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use domain::oauth_flow::{self, CallbackOutcome, CallbackParams, LoginOutcome};
use domain::ProviderKind;
use log::*;

fn callback_path(provider: ProviderKind) -> String {
    format!("/{provider}/callback/")
}

/// GET /{provider}/login
///
/// Redirects to the provider's consent page, or straight to the callback when the session
/// already holds a token for this provider.
#[utoipa::path(
    get,
    path = "/{provider}/login",
    params(
        ("provider" = String, Path, description = "`vk` or `github`"),
    ),
    responses(
        (status = 303, description = "Already signed in, redirect to the callback"),
        (status = 307, description = "Redirect to the provider's authorization page"),
        (status = 400, description = "Unknown provider"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Path(provider_kind): Path<ProviderKind>,
    Tokens(tokens): Tokens,
) -> Result<impl IntoResponse, Error> {
    debug!("GET /{provider_kind}/login");

    let provider = app_state.provider(provider_kind);
    match oauth_flow::login(provider.as_ref(), &tokens).await? {
        LoginOutcome::AlreadyAuthenticated => Ok(Redirect::to(&callback_path(provider_kind))),
        LoginOutcome::Redirect(request) => Ok(Redirect::temporary(&request.url)),
    }
}

/// GET /{provider}/callback/
///
/// Exchanges the authorization code for an access token and redirects back to itself. Once the
/// session holds a token, shows the provider profile instead.
#[utoipa::path(
    get,
    path = "/{provider}/callback/",
    params(
        ("provider" = String, Path, description = "`vk` or `github`"),
        ("code" = Option<String>, Query, description = "Authorization code from the provider"),
        ("state" = Option<String>, Query, description = "State sent with the authorization redirect"),
        ("error" = Option<String>, Query, description = "Set when the user declined consent"),
        ("error_description" = Option<String>, Query, description = "Provider's reason for `error`"),
    ),
    responses(
        (status = 200, description = "Profile view of the signed in user"),
        (status = 303, description = "Token stored, redirect to the profile view"),
        (status = 400, description = "Missing authorization code or invalid state"),
        (status = 401, description = "The provider rejected the code or the token"),
        (status = 502, description = "The provider could not be reached or answered unexpectedly"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Path(provider_kind): Path<ProviderKind>,
    Tokens(tokens): Tokens,
    Query(params): Query<CallbackParams>,
) -> Result<Response, Error> {
    debug!("GET /{provider_kind}/callback/");

    let provider = app_state.provider(provider_kind);
    match oauth_flow::callback(provider.as_ref(), &tokens, params).await? {
        CallbackOutcome::Profile(profile) => {
            Ok(Json(ApiResponse::new(StatusCode::OK.into(), profile)).into_response())
        }
        CallbackOutcome::Authenticated => {
            Ok(Redirect::to(&callback_path(provider_kind)).into_response())
        }
    }
}

/// GET|POST /{provider}/logout
#[utoipa::path(
    get,
    path = "/{provider}/logout",
    params(
        ("provider" = String, Path, description = "`vk` or `github`"),
    ),
    responses(
        (status = 303, description = "Token removed, redirect to the landing page"),
        (status = 400, description = "Unknown provider"),
    )
)]
pub async fn logout(
    Path(provider_kind): Path<ProviderKind>,
    Tokens(tokens): Tokens,
) -> Result<impl IntoResponse, Error> {
    debug!("/{provider_kind}/logout");

    oauth_flow::logout(provider_kind, &tokens).await?;

    Ok(Redirect::to("/"))
}
