use crate::api::{ApiError, CreateUserRequest, ListUsersResponse, UserResponse, api_error};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use itroom::auth::User;
use tracing::{error, info};

/// POST /api/users - Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    info!(
        "CREATE_USER: username={}, role={}, requested_by={}",
        req.username, req.role, current_user.username
    );

    match state
        .user_service
        .create_user(req.username, req.password, req.role, &current_user)
        .await
    {
        Ok(user) => Ok((StatusCode::CREATED, Json(user.into()))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(api_error(e))
        }
    }
}

/// GET /api/users - List all users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ListUsersResponse>, ApiError> {
    let users = state.user_service.list_users().await.map_err(api_error)?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /api/users/{username} - Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!(
        "DELETE_USER: username={}, requested_by={}",
        username, current_user.username
    );

    match state.user_service.delete_user(&username, &current_user).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete user {}: {}", username, e);
            Err(api_error(e))
        }
    }
}
