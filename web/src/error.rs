use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InputErrorKind, InternalErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Failures that originate in the web layer itself.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// The session signing key could not be built from the configured secret.
    SessionKey,
    /// The session database could not be opened or prepared.
    SessionStore,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Domain(domain_error) => domain_error_into_response(domain_error),
            Error::Web(web_error_kind) => {
                error!("Web error: {web_error_kind:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

fn domain_error_into_response(domain_error: DomainError) -> Response {
    match domain_error.error_kind {
        DomainErrorKind::Input(input_error_kind) => match input_error_kind {
            InputErrorKind::MissingCode => {
                (StatusCode::BAD_REQUEST, "Error: Missing authorization code").into_response()
            }
            InputErrorKind::InvalidState => {
                (StatusCode::BAD_REQUEST, "Error: Invalid OAuth state").into_response()
            }
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Rejected(description) => {
                (StatusCode::UNAUTHORIZED, format!("Error: {description}")).into_response()
            }
            ExternalErrorKind::MissingAccessToken => {
                (StatusCode::BAD_GATEWAY, "Error: No access token received").into_response()
            }
            ExternalErrorKind::Network(description) => {
                (StatusCode::BAD_GATEWAY, format!("Request failed: {description}"))
                    .into_response()
            }
            ExternalErrorKind::InvalidResponse(description) => (
                StatusCode::BAD_GATEWAY,
                format!("Error: Invalid provider response: {description}"),
            )
                .into_response(),
        },
        DomainErrorKind::Internal(internal_error_kind) => {
            match internal_error_kind {
                InternalErrorKind::Config => error!("Configuration error: {:?}", domain_error.source),
                InternalErrorKind::Session => error!("Session error: {:?}", domain_error.source),
                InternalErrorKind::Other(message) => error!("Internal error: {message}"),
            }
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}
