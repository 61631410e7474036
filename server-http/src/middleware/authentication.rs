use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use itroom::auth::{AuthService, User};
use std::sync::Arc;
use tracing::error;

const REALM: &str = "Basic realm=\"ITRoom\"";

/// Extract Basic Auth credentials from Authorization header
fn extract_basic_auth(auth_header: &str) -> Option<(String, String)> {
    // Authorization: Basic <base64>
    let parts: Vec<&str> = auth_header.split_whitespace().collect();

    if parts.len() != 2 || parts[0] != "Basic" {
        return None;
    }

    let decoded = STANDARD.decode(parts[1]).ok()?;
    let decoded_str = String::from_utf8(decoded).ok()?;

    // Passwords may contain ':'
    let (username, password) = decoded_str.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

fn unauthorized(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        message,
    )
        .into_response()
}

/// Authentication middleware; attaches the authenticated [`User`] to the request
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let (username, password) = extract_basic_auth(auth_header)
        .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

    let user = match auth_service.authenticate(&username, &password).await {
        Ok(user) => user,
        Err(e) if e.is_infrastructure() => {
            error!("Authentication failed for {}: {}", username, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
        Err(_) => {
            return Err(unauthorized("Invalid credentials"));
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extract authenticated user from request extensions
pub fn get_authenticated_user(request: &Request) -> Option<&User> {
    request.extensions().get::<User>()
}
