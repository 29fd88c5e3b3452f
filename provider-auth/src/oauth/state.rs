//! CSRF state tokens for the authorization redirect.

use rand::Rng;
use subtle::ConstantTimeEq;

/// Generate a cryptographically random state token.
pub fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Compare the state issued at login with the one the provider echoed back.
///
/// A missing value on either side never matches.
pub fn states_match(expected: Option<&str>, received: Option<&str>) -> bool {
    match (expected, received) {
        (Some(expected), Some(received)) if expected.len() == received.len() => {
            expected.as_bytes().ct_eq(received.as_bytes()).into()
        }
        _ => false,
    }
}
