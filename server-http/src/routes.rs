use crate::handlers;
use crate::middleware::{auth_middleware, permission_layer, require_elevated};
use crate::state::AppState;
use axum::{
    Router,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use itroom::auth::{Action, ModuleKey};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build and configure the application router
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let auth = state.auth_service.clone();

    // Permission administration is reserved to elevated roles
    let permission_admin = Router::new()
        .route("/api/permissions", get(handlers::list_permissions))
        .route("/api/permissions/reload", post(handlers::reload_permissions))
        .route(
            "/api/permissions/{role}/{module}",
            put(handlers::set_permission).delete(handlers::delete_permission),
        )
        .route_layer(from_fn_with_state(auth.clone(), require_elevated));

    // User administration is gated per action on the `users` module
    let users = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).route_layer(from_fn_with_state(
                auth.clone(),
                permission_layer(ModuleKey::users(), Action::read()),
            )),
        )
        .route(
            "/api/users",
            post(handlers::create_user).route_layer(from_fn_with_state(
                auth.clone(),
                permission_layer(ModuleKey::users(), Action::create()),
            )),
        )
        .route(
            "/api/users/{username}",
            delete(handlers::delete_user).route_layer(from_fn_with_state(
                auth.clone(),
                permission_layer(ModuleKey::users(), Action::delete()),
            )),
        );

    let authenticated = Router::new()
        .route("/api/modules", get(handlers::list_modules))
        .route("/api/permissions/me", get(handlers::my_permissions))
        .merge(permission_admin)
        .merge(users)
        .layer(from_fn_with_state(auth, auth_middleware));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .merge(authenticated)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
