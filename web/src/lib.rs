//! HTTP surface of the OAuth profile viewer: routes, controllers and the cookie session layer.

use std::sync::Arc;
use std::time::Duration;

use domain::gateway::oauth::{Provider, Providers};
use domain::ProviderKind;
use log::*;
use service::config::Config;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, ExpiredDeletion, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

mod controller;
pub mod error;
mod extractors;
pub mod router;

pub use error::{Error, Result};
use error::WebErrorKind;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    providers: Providers,
}

impl AppState {
    /// Build the providers described by `config`.
    pub fn new(config: Config) -> Result<Self> {
        let providers = Providers::from_config(&config)?;
        Ok(Self::with_providers(config, providers))
    }

    pub fn with_providers(config: Config, providers: Providers) -> Self {
        Self { config, providers }
    }

    pub fn provider(&self, kind: ProviderKind) -> Arc<dyn Provider> {
        self.providers.get(kind)
    }
}

/// Connect to the session database configured by `SESSION_STORE_URL`.
///
/// An in-memory SQLite database lives only as long as its connection, so the pool holds exactly
/// one connection that is never recycled.
pub async fn session_pool(config: &Config) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(config.session_store_url())
        .await
        .map_err(session_store_error)
}

/// The session store on `pool`, with its table created.
pub async fn session_store(pool: SqlitePool) -> Result<SqliteStore> {
    let store = SqliteStore::new(pool);
    store.migrate().await.map_err(session_store_error)?;
    Ok(store)
}

fn session_store_error(e: sqlx::Error) -> Error {
    error!("Session store error: {e}");
    Error::Web(WebErrorKind::SessionStore)
}

/// Delete expired sessions from `store` every `period` until the task is aborted.
///
/// A failed sweep is logged and retried on the next tick.
pub fn spawn_expired_session_cleanup(store: SqliteStore, period: Duration) -> JoinHandle<()> {
    tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match store.delete_expired().await {
                Ok(()) => trace!("Deleted expired sessions"),
                Err(e) => warn!("Failed to delete expired sessions: {e}"),
            }
        }
    })
}

/// Cookie sessions signed with `SESSION_SECRET`.
///
/// `SameSite=Lax` so the cookie comes along on the provider's top-level redirect back to the
/// callback route.
pub fn session_layer(
    config: &Config,
    store: SqliteStore,
) -> Result<SessionManagerLayer<SqliteStore, SignedCookie>> {
    let secret = config.session_secret().unwrap_or_default();
    let key = Key::try_from(secret.as_bytes()).map_err(|e| {
        error!("Unable to derive the session signing key: {e}");
        Error::Web(WebErrorKind::SessionKey)
    })?;

    Ok(SessionManagerLayer::new(store)
        .with_signed(key)
        .with_secure(config.is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            config.backend_session_expiry_seconds as i64,
        ))))
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state.config.interface.as_deref().unwrap_or("127.0.0.1");
    let address = format!("{interface}:{}", app_state.config.port);

    let invalid_input =
        |e: Error| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string());
    let pool = session_pool(&app_state.config)
        .await
        .map_err(invalid_input)?;
    let store = session_store(pool).await.map_err(invalid_input)?;
    let deletion_task = spawn_expired_session_cleanup(
        store.clone(),
        app_state.config.session_cleanup_interval(),
    );

    let session_layer = session_layer(&app_state.config, store).map_err(invalid_input)?;
    let app = router::define_routes(app_state.clone()).layer(session_layer);

    let listener = TcpListener::bind(&address).await?;
    info!("Server starting... listening for connections on http://{address}");

    let served = axum::serve(listener, app).await;
    deletion_task.abort();
    served
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A router wired to mock provider servers, and helpers to drive it like a browser.

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use axum::Router;
    use clap::Parser;
    use tower::ServiceExt;

    pub(crate) const SESSION_SECRET: &str =
        "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    /// Config whose provider endpoints all point at `mock_url`.
    pub(crate) fn config_for(mock_url: &str) -> Config {
        Config::try_parse_from([
            "oauth_profiles",
            "--session-secret",
            SESSION_SECRET,
            "--vk-client-id",
            "vk-client",
            "--vk-client-secret",
            "vk-secret",
            "--vk-redirect-uri",
            "http://localhost:5000/vk/callback/",
            "--github-client-id",
            "gh-client",
            "--github-client-secret",
            "gh-secret",
            "--github-redirect-uri",
            "http://localhost:5000/github/callback/",
            "--vk-oauth-url",
            mock_url,
            "--vk-api-url",
            mock_url,
            "--github-oauth-url",
            mock_url,
            "--github-api-url",
            mock_url,
        ])
        .unwrap()
    }

    pub(crate) async fn app(config: Config) -> Router {
        let pool = session_pool(&config).await.unwrap();
        let store = session_store(pool).await.unwrap();
        let layer = session_layer(&config, store).unwrap();
        let app_state = AppState::new(config).unwrap();
        router::define_routes(app_state).layer(layer)
    }

    /// Send a GET carrying `cookie`. Returns the response and the session cookie to use next.
    pub(crate) async fn get(
        app: &Router,
        uri: &str,
        cookie: Option<&str>,
    ) -> (Response<Body>, Option<String>) {
        send(app, "GET", uri, cookie).await
    }

    pub(crate) async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
    ) -> (Response<Body>, Option<String>) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let next_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string)
            .or_else(|| cookie.map(str::to_string));
        (response, next_cookie)
    }

    pub(crate) fn location(response: &Response<Body>) -> String {
        assert!(
            response.status().is_redirection(),
            "expected a redirect, got {}",
            response.status()
        );
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    pub(crate) async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub(crate) async fn body_json(response: Response<Body>) -> serde_json::Value {
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    /// Value of the `state` query parameter of an authorization redirect.
    pub(crate) fn state_param(authorization_url: &str) -> String {
        let query = authorization_url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("state="))
            .unwrap()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::SessionStore;

    async fn test_store() -> (SqlitePool, SqliteStore) {
        let config = test_support::config_for("http://127.0.0.1:1");
        let pool = session_pool(&config).await.unwrap();
        let store = session_store(pool.clone()).await.unwrap();
        (pool, store)
    }

    async fn stored_sessions(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("select count(*) from tower_sessions")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn record_expiring_in(offset: time::Duration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: time::OffsetDateTime::now_utc() + offset,
        }
    }

    #[tokio::test]
    async fn test_session_layer_rejects_short_secret() {
        let (_, store) = test_store().await;
        let config =
            Config::try_parse_from(["oauth_profiles", "--session-secret", "too-short"]).unwrap();

        let err = session_layer(&config, store).err().unwrap();

        assert!(matches!(err, Error::Web(WebErrorKind::SessionKey)));
    }

    #[tokio::test]
    async fn test_session_layer_accepts_configured_secret() {
        let (_, store) = test_store().await;
        let config = test_support::config_for("http://127.0.0.1:1");
        assert!(session_layer(&config, store).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_session_database_is_store_error() {
        let mut args: Vec<String> = ["oauth_profiles", "--session-store-url"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push("sqlite:///nonexistent-dir/sessions.db".to_string());
        let config = Config::try_parse_from(args).unwrap();

        let err = session_pool(&config).await.err().unwrap();

        assert!(matches!(err, Error::Web(WebErrorKind::SessionStore)));
    }

    #[tokio::test]
    async fn test_cleanup_task_deletes_only_expired_sessions() {
        let (pool, store) = test_store().await;
        let mut expired = record_expiring_in(time::Duration::days(-1));
        let mut live = record_expiring_in(time::Duration::days(1));
        store.create(&mut expired).await.unwrap();
        store.create(&mut live).await.unwrap();
        assert_eq!(stored_sessions(&pool).await, 2);

        let cleanup = spawn_expired_session_cleanup(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;
        cleanup.abort();

        assert_eq!(stored_sessions(&pool).await, 1);
        assert!(store.load(&expired.id).await.unwrap().is_none());
        assert!(store.load(&live.id).await.unwrap().is_some());
    }
}
