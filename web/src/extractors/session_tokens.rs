use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use domain::session_tokens::SessionTokens;
use tower_sessions::Session;

/// The provider tokens of the requesting browser's session.
pub(crate) struct Tokens(pub SessionTokens);

impl<S> FromRequestParts<S> for Tokens
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Tokens(SessionTokens::new(session)))
    }
}
