use super::authentication::get_authenticated_user;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use itroom::auth::{Action, AuthError, AuthService, ModuleKey, User};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, warn};

/// Check that the authenticated user may perform `action` on `module_key`
pub async fn require_action(
    module_key: ModuleKey,
    action: Action,
    auth_service: Arc<AuthService>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let user = extract_user_from_request(&request)?;

    match auth_service.authorize(&user, &module_key, &action).await {
        Ok(()) => Ok(next.run(request).await),
        Err(AuthError::PermissionDenied) => {
            warn!(
                user = %user.username,
                role = %user.role,
                module = %module_key,
                action = %action,
                "permission denied"
            );
            Err((StatusCode::FORBIDDEN, "Insufficient permissions").into_response())
        }
        Err(e) => {
            // Store outage: answer 500, not 403
            error!(
                user = %user.username,
                module = %module_key,
                action = %action,
                "authorization degraded: {}",
                e
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

/// Only let elevated roles through
pub async fn require_elevated(
    State(auth_service): State<Arc<AuthService>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let user = extract_user_from_request(&request)?;

    if auth_service.is_elevated(&user) {
        Ok(next.run(request).await)
    } else {
        warn!(user = %user.username, role = %user.role, "elevated role required");
        Err((StatusCode::FORBIDDEN, "Insufficient permissions").into_response())
    }
}

/// Clone the User out of the request so the request can be moved on
fn extract_user_from_request(request: &Request) -> Result<User, Response> {
    get_authenticated_user(request)
        .cloned()
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Authentication required").into_response())
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, Response>> + Send>>;

/// Middleware factory gating a route on one (module, action) pair
pub fn permission_layer(
    module_key: ModuleKey,
    action: Action,
) -> impl Fn(State<Arc<AuthService>>, Request, Next) -> MiddlewareFuture + Clone {
    move |State(auth_service): State<Arc<AuthService>>, request: Request, next: Next| {
        let module_key = module_key.clone();
        let action = action.clone();
        let fut: MiddlewareFuture = Box::pin(async move {
            require_action(module_key, action, auth_service, request, next).await
        });
        fut
    }
}
