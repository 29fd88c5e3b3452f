//! Token endpoint response decoding shared by all providers.

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Body of a token endpoint response. Both providers answer with either an access token or
/// an `error` / `error_description` pair, regardless of the HTTP status they send.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Decode a token endpoint body into the access token it carries.
pub(crate) fn decode_token_response(body: &str) -> Result<SecretString, Error> {
    let response: TokenResponse = serde_json::from_str(body).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
    })?;

    if let Some(error) = response.error {
        let description = response
            .error_description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                if error.is_empty() {
                    "Unknown error".to_string()
                } else {
                    error
                }
            });
        return Err(oauth_error(OAuthErrorKind::ProviderRejected, &description));
    }

    match response.access_token {
        Some(token) if !token.is_empty() => Ok(SecretString::new(token)),
        _ => Err(oauth_error(
            OAuthErrorKind::MissingAccessToken,
            "No access token received",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use secrecy::ExposeSecret;

    #[test]
    fn test_access_token_is_extracted() {
        let token =
            decode_token_response(r#"{"access_token":"gho_abc","token_type":"bearer","scope":"user"}"#)
                .unwrap();
        assert_eq!(token.expose_secret(), "gho_abc");
    }

    #[test]
    fn test_error_payload_carries_description() {
        let err = decode_token_response(r#"{"error":"x","error_description":"y"}"#).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::ProviderRejected)
        );
        assert_eq!(err.description(), "y");
    }

    #[test]
    fn test_error_payload_without_description_uses_error_code() {
        let err = decode_token_response(r#"{"error":"invalid_grant"}"#).unwrap_err();
        assert_eq!(err.description(), "invalid_grant");
    }

    #[test]
    fn test_missing_access_token_is_distinct_failure() {
        let err = decode_token_response(r#"{"token_type":"bearer"}"#).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::MissingAccessToken)
        );

        let err = decode_token_response(r#"{"access_token":""}"#).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::MissingAccessToken)
        );
    }

    #[test]
    fn test_non_json_body_is_invalid_response() {
        let err = decode_token_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse)
        );
    }
}
