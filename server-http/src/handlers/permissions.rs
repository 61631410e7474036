use crate::api::{
    ApiError, ListPermissionsResponse, MyPermissionsResponse, PermissionResponse,
    SetPermissionRequest, api_error,
};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use itroom::auth::defaults::module_catalogue;
use itroom::auth::{ModuleKey, RoleName, User};
use std::collections::BTreeMap;
use tracing::info;

fn parse_pair(role: &str, module: &str) -> Result<(RoleName, ModuleKey), ApiError> {
    let role = RoleName::parse(role).map_err(api_error)?;
    let module_key = ModuleKey::parse(module).map_err(api_error)?;
    Ok((role, module_key))
}

/// GET /api/permissions - List every permission record
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<ListPermissionsResponse>, ApiError> {
    let records = state
        .permission_service
        .list_records()
        .await
        .map_err(api_error)?;

    Ok(Json(ListPermissionsResponse {
        permissions: records.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/permissions/me - Resolved actions of the caller for every module
pub async fn my_permissions(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MyPermissionsResponse>, ApiError> {
    let mut modules = BTreeMap::new();

    for module in module_catalogue() {
        let actions = state
            .auth_service
            .effective_actions(&current_user, &module.key)
            .await
            .map_err(api_error)?;
        modules.insert(module.key, actions.as_ref().clone());
    }

    Ok(Json(MyPermissionsResponse {
        elevated: state.auth_service.is_elevated(&current_user),
        role: current_user.role,
        modules,
    }))
}

/// PUT /api/permissions/{role}/{module} - Replace the actions of a role on a module
pub async fn set_permission(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Path((role, module)): Path<(String, String)>,
    Json(req): Json<SetPermissionRequest>,
) -> Result<Json<PermissionResponse>, ApiError> {
    let (role, module_key) = parse_pair(&role, &module)?;

    info!(
        "SET_PERMISSION: role={}, module={}, requested_by={}",
        role, module_key, current_user.username
    );

    let record = state
        .permission_service
        .set_actions(role, module_key, req.actions)
        .await
        .map_err(api_error)?;

    Ok(Json(record.into()))
}

/// DELETE /api/permissions/{role}/{module} - Remove a record, revoking every action
pub async fn delete_permission(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Path((role, module)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (role, module_key) = parse_pair(&role, &module)?;

    info!(
        "DELETE_PERMISSION: role={}, module={}, requested_by={}",
        role, module_key, current_user.username
    );

    state
        .permission_service
        .remove(&role, &module_key)
        .await
        .map_err(api_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/permissions/reload - Drop every cached permission
pub async fn reload_permissions(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
) -> StatusCode {
    info!("RELOAD_PERMISSIONS: requested_by={}", current_user.username);
    state.permission_service.reload();
    StatusCode::NO_CONTENT
}
