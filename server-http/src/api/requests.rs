use itroom::auth::{ActionSet, RoleName};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: RoleName,
}

/// Body of `PUT /api/permissions/{role}/{module}`; names are validated on deserialization.
#[derive(Debug, Deserialize)]
pub struct SetPermissionRequest {
    pub actions: ActionSet,
}
