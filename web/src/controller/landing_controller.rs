use crate::controller::ApiResponse;
use crate::extractors::session_tokens::Tokens;
use crate::Error;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::oauth_flow;
use log::*;

/// GET which providers the current session is signed in with
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "`vk_logged_in` and `github_logged_in` flags of the session"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn index(Tokens(tokens): Tokens) -> Result<impl IntoResponse, Error> {
    debug!("GET landing page");

    let status = oauth_flow::login_status(&tokens).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), status)))
}
