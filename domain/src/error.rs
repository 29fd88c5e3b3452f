//! Error types for the `domain` layer.
use provider_auth::error::{
    ApiErrorKind, Error as ProviderAuthError, ErrorKind as ProviderAuthErrorKind, HttpErrorKind,
    OAuthErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Ex. `domain` is dependent on `provider-auth`, and `web` is dependent on `domain`,
/// but `web` should not be dependent, directly, on `provider-auth`. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Input(InputErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Session,
    Other(String),
}

/// Failures of calls to an OAuth provider. The strings carry the description shown to the user.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// Connection error or timeout.
    Network(String),
    /// The provider refused the request, e.g. an invalid code or a revoked token.
    Rejected(String),
    MissingAccessToken,
    InvalidResponse(String),
}

/// Problems with what the browser sent to a callback.
#[derive(Debug, PartialEq)]
pub enum InputErrorKind {
    MissingCode,
    InvalidState,
}

impl Error {
    pub(crate) fn input(kind: InputErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Input(kind),
        }
    }

    pub(crate) fn config(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(err: tower_sessions::session::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Session),
        }
    }
}

// This is where we translate errors from the `provider-auth` layer to the `domain` layer.
impl From<ProviderAuthError> for Error {
    fn from(err: ProviderAuthError) -> Self {
        let description = err.description();
        let error_kind = match &err.error_kind {
            ProviderAuthErrorKind::Config => DomainErrorKind::Internal(InternalErrorKind::Config),
            ProviderAuthErrorKind::OAuth(OAuthErrorKind::ProviderRejected)
            | ProviderAuthErrorKind::Api(ApiErrorKind::Rejected) => {
                DomainErrorKind::External(ExternalErrorKind::Rejected(description))
            }
            ProviderAuthErrorKind::OAuth(OAuthErrorKind::MissingAccessToken) => {
                DomainErrorKind::External(ExternalErrorKind::MissingAccessToken)
            }
            ProviderAuthErrorKind::OAuth(OAuthErrorKind::InvalidResponse)
            | ProviderAuthErrorKind::Api(ApiErrorKind::InvalidResponse) => {
                DomainErrorKind::External(ExternalErrorKind::InvalidResponse(description))
            }
            ProviderAuthErrorKind::Http(HttpErrorKind::Timeout)
            | ProviderAuthErrorKind::Http(HttpErrorKind::Network) => {
                DomainErrorKind::External(ExternalErrorKind::Network(description))
            }
            ProviderAuthErrorKind::Http(HttpErrorKind::BuilderFailed) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                ))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_auth::error::{api_error, oauth_error};

    #[test]
    fn test_provider_rejection_keeps_description() {
        let err: Error = oauth_error(OAuthErrorKind::ProviderRejected, "y").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Rejected("y".to_string()))
        );
    }

    #[test]
    fn test_missing_token_is_distinct_from_rejection() {
        let err: Error =
            oauth_error(OAuthErrorKind::MissingAccessToken, "No access token received").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::MissingAccessToken)
        );
    }

    #[test]
    fn test_api_rejection_maps_to_rejected() {
        let err: Error = api_error(ApiErrorKind::Rejected, "Bad credentials").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Rejected("Bad credentials".to_string()))
        );
    }

    #[test]
    fn test_timeout_maps_to_network() {
        let err: Error = ProviderAuthError {
            source: Some("operation timed out".into()),
            error_kind: ProviderAuthErrorKind::Http(HttpErrorKind::Timeout),
        }
        .into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Network(
                "operation timed out".to_string()
            ))
        );
    }
}
