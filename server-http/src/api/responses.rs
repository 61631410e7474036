use axum::{Json, http::StatusCode};
use chrono::{DateTime, Utc};
use itroom::auth::defaults::ModuleInfo;
use itroom::auth::{ActionSet, AuthError, ModuleKey, PermissionRecord, RoleName, User};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: RoleName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub role: RoleName,
    pub module_key: ModuleKey,
    pub actions: ActionSet,
    pub updated_at: DateTime<Utc>,
}

impl From<PermissionRecord> for PermissionResponse {
    fn from(record: PermissionRecord) -> Self {
        Self {
            role: record.role,
            module_key: record.module_key,
            actions: record.actions,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListPermissionsResponse {
    pub permissions: Vec<PermissionResponse>,
}

/// Resolved actions of the calling user, per module
#[derive(Debug, Serialize)]
pub struct MyPermissionsResponse {
    pub role: RoleName,
    /// When set, every action is allowed, including ones not listed in `modules`
    pub elevated: bool,
    pub modules: BTreeMap<ModuleKey, ActionSet>,
}

#[derive(Debug, Serialize)]
pub struct ListModulesResponse {
    pub modules: Vec<ModuleInfo>,
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a service error onto a status code.
///
/// Infrastructure failures are logged and answered with a generic 500 so they
/// never read as an ordinary denial.
pub fn api_error(err: AuthError) -> ApiError {
    let status = match &err {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::PermissionDenied => StatusCode::FORBIDDEN,
        AuthError::UserNotFound | AuthError::PermissionRecordNotFound => StatusCode::NOT_FOUND,
        AuthError::UserAlreadyExists => StatusCode::CONFLICT,
        AuthError::WeakPassword
        | AuthError::CannotDeleteSelf
        | AuthError::ElevatedRolePermissions
        | AuthError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        AuthError::StoreUnavailable(_)
        | AuthError::SerializationError(_)
        | AuthError::PasswordHashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Internal error: {}", err);
        return (status, Json(ErrorResponse::new("Internal server error")));
    }

    (status, Json(ErrorResponse::new(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(api_error(AuthError::PermissionDenied).0, StatusCode::FORBIDDEN);
        assert_eq!(api_error(AuthError::UserAlreadyExists).0, StatusCode::CONFLICT);
        assert_eq!(
            api_error(AuthError::InvalidKey("role must not be empty".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            api_error(AuthError::PermissionRecordNotFound).0,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_infrastructure_errors_are_generic() {
        let (status, Json(body)) =
            api_error(AuthError::StoreUnavailable("io error: disk full".into()));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }
}
