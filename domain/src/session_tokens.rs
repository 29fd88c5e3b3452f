//! Per-session storage of provider access tokens.

use async_trait::async_trait;
use provider_auth::oauth::ProviderKind;
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;

use crate::error::Error;

/// Access tokens and pending CSRF state of one browser session.
///
/// Concurrency: every request works on its own copy of the session record and the whole record
/// is written back when the request completes. Two requests racing on the same session are
/// therefore last-writer-wins. A token is always written as one complete value, so after a race
/// the stored token is exactly one of the competing values, never a mix of both and never empty.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn token(&self, provider: ProviderKind) -> Result<Option<String>, Error>;

    async fn store_token(&self, provider: ProviderKind, token: &SecretString)
        -> Result<(), Error>;

    async fn clear_token(&self, provider: ProviderKind) -> Result<(), Error>;

    /// Remember the state sent with the authorization redirect.
    async fn store_state(&self, provider: ProviderKind, state: &str) -> Result<(), Error>;

    /// Remove and return the pending state. A state can be used by one callback only.
    async fn take_state(&self, provider: ProviderKind) -> Result<Option<String>, Error>;

    /// Presence of a token is the only signal of being signed in with a provider.
    async fn is_authenticated(&self, provider: ProviderKind) -> Result<bool, Error> {
        Ok(self.token(provider).await?.is_some())
    }
}

/// `TokenRepository` backed by the cookie session of the current request.
#[derive(Clone, Debug)]
pub struct SessionTokens {
    session: Session,
}

impl SessionTokens {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

fn token_key(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Vk => "vk_token",
        ProviderKind::GitHub => "github_token",
    }
}

fn state_key(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Vk => "vk_oauth_state",
        ProviderKind::GitHub => "github_oauth_state",
    }
}

#[async_trait]
impl TokenRepository for SessionTokens {
    async fn token(&self, provider: ProviderKind) -> Result<Option<String>, Error> {
        Ok(self.session.get::<String>(token_key(provider)).await?)
    }

    async fn store_token(
        &self,
        provider: ProviderKind,
        token: &SecretString,
    ) -> Result<(), Error> {
        self.session
            .insert(token_key(provider), token.expose_secret())
            .await?;
        Ok(())
    }

    async fn clear_token(&self, provider: ProviderKind) -> Result<(), Error> {
        self.session
            .remove::<String>(token_key(provider))
            .await?;
        Ok(())
    }

    async fn store_state(&self, provider: ProviderKind, state: &str) -> Result<(), Error> {
        self.session.insert(state_key(provider), state).await?;
        Ok(())
    }

    async fn take_state(&self, provider: ProviderKind) -> Result<Option<String>, Error> {
        Ok(self.session.remove::<String>(state_key(provider)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string())
    }

    fn fresh_tokens() -> SessionTokens {
        SessionTokens::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[tokio::test]
    async fn test_fresh_session_has_no_tokens() {
        let tokens = fresh_tokens();
        for provider in ProviderKind::ALL {
            assert_eq!(tokens.token(provider).await.unwrap(), None);
            assert!(!tokens.is_authenticated(provider).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_tokens_are_kept_per_provider() {
        let tokens = fresh_tokens();
        tokens
            .store_token(ProviderKind::GitHub, &secret("gho_1"))
            .await
            .unwrap();

        assert_eq!(
            tokens.token(ProviderKind::GitHub).await.unwrap(),
            Some("gho_1".to_string())
        );
        assert_eq!(tokens.token(ProviderKind::Vk).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_token_leaves_other_provider() {
        let tokens = fresh_tokens();
        tokens
            .store_token(ProviderKind::Vk, &secret("vk_1"))
            .await
            .unwrap();
        tokens
            .store_token(ProviderKind::GitHub, &secret("gho_1"))
            .await
            .unwrap();

        tokens.clear_token(ProviderKind::Vk).await.unwrap();

        assert!(!tokens.is_authenticated(ProviderKind::Vk).await.unwrap());
        assert!(tokens.is_authenticated(ProviderKind::GitHub).await.unwrap());
    }

    #[tokio::test]
    async fn test_state_is_consumed_once() {
        let tokens = fresh_tokens();
        tokens
            .store_state(ProviderKind::Vk, "state-1")
            .await
            .unwrap();

        assert_eq!(
            tokens.take_state(ProviderKind::Vk).await.unwrap(),
            Some("state-1".to_string())
        );
        assert_eq!(tokens.take_state(ProviderKind::Vk).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_racing_writes_leave_one_complete_token() {
        let store = Arc::new(MemoryStore::default());

        // First request creates the session record.
        let first = Session::new(None, store.clone(), None);
        first.insert("created", true).await.unwrap();
        first.save().await.unwrap();
        let id = first.id().unwrap();

        // Two requests load the same record, then both write a different token.
        let left = Session::new(Some(id), store.clone(), None);
        let right = Session::new(Some(id), store.clone(), None);
        let left_tokens = SessionTokens::new(left.clone());
        let right_tokens = SessionTokens::new(right.clone());
        assert_eq!(left_tokens.token(ProviderKind::GitHub).await.unwrap(), None);
        assert_eq!(right_tokens.token(ProviderKind::GitHub).await.unwrap(), None);

        let (l, r) = tokio::join!(
            async {
                left_tokens
                    .store_token(ProviderKind::GitHub, &secret("token-left"))
                    .await?;
                left.save().await.map_err(Error::from)
            },
            async {
                right_tokens
                    .store_token(ProviderKind::GitHub, &secret("token-right"))
                    .await?;
                right.save().await.map_err(Error::from)
            }
        );
        l.unwrap();
        r.unwrap();

        let reloaded = SessionTokens::new(Session::new(Some(id), store, None));
        let stored = reloaded.token(ProviderKind::GitHub).await.unwrap();
        assert!(
            matches!(stored.as_deref(), Some("token-left") | Some("token-right")),
            "unexpected token after race: {stored:?}"
        );
    }
}
