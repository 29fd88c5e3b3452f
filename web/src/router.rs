use crate::AppState;
use axum::{routing::get, Router};

use crate::controller::{health_check_controller, landing_controller, oauth_controller};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "OAuth Profiles API"
        ),
        paths(
            landing_controller::index,
            oauth_controller::login,
            oauth_controller::callback,
            oauth_controller::logout,
            health_check_controller::health_check,
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "oauth_profiles", description = "Sign in with VK or GitHub and view the profile")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Provider tokens live in the signed cookie session, so document the cookie.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "id",
                "Signed session id set on the first visit to a login route",
            ))),
        )
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(landing_routes(app_state.clone()))
        .merge(oauth_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn landing_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_controller::index))
        .with_state(app_state)
}

/// Routes of the OAuth flow, one set per provider path segment
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/{provider}/login", get(oauth_controller::login))
        .route("/{provider}/callback/", get(oauth_controller::callback))
        .route(
            "/{provider}/logout",
            get(oauth_controller::logout).post(oauth_controller::logout),
        )
        .with_state(app_state)
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
