use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, header};
use base64::{Engine, engine::general_purpose::STANDARD};
use itroom::auth::{
    AuthError, ElevatedRoles, ModuleKey, PermissionRecord, PermissionRepository, RoleName,
    SledPermissionRepository, SledUserRepository, UserRepository,
};
use server_http::AppState;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const ADMIN: (&str, &str) = ("admin", "admin123");
pub const STAFF: (&str, &str) = ("clerk", "clerk2024");

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// State over fresh sled stores with an admin and a staff account.
pub async fn test_state(temp_dir: &TempDir) -> AppState {
    let permissions = Arc::new(
        SledPermissionRepository::new(temp_dir.path().join("permissions.sled")).expect("store"),
    );
    state_with_store(temp_dir, permissions).await
}

pub async fn state_with_store(
    temp_dir: &TempDir,
    permissions: Arc<dyn PermissionRepository>,
) -> AppState {
    let users: Arc<dyn UserRepository> =
        Arc::new(SledUserRepository::new(temp_dir.path().join("users.sled")).expect("users"));
    let state = AppState::new(
        users,
        permissions,
        Duration::from_secs(30),
        ElevatedRoles::default(),
    );

    state
        .user_service
        .seed_user(ADMIN.0.to_string(), ADMIN.1.to_string(), RoleName::admin())
        .await
        .expect("admin");
    state
        .user_service
        .seed_user(STAFF.0.to_string(), STAFF.1.to_string(), RoleName::staff())
        .await
        .expect("staff");

    state
}

pub fn request(
    method: &str,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some((username, password)) = credentials {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        builder = builder.header(header::AUTHORIZATION, format!("Basic {}", encoded));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// A permission store that is always down.
#[derive(Default)]
pub struct FailingStore;

fn down() -> AuthError {
    AuthError::StoreUnavailable("connection refused".into())
}

#[async_trait]
impl PermissionRepository for FailingStore {
    async fn find(
        &self,
        _role: &RoleName,
        _module_key: &ModuleKey,
    ) -> Result<Option<PermissionRecord>, AuthError> {
        Err(down())
    }

    async fn upsert(&self, _record: PermissionRecord) -> Result<PermissionRecord, AuthError> {
        Err(down())
    }

    async fn delete(&self, _role: &RoleName, _module_key: &ModuleKey) -> Result<bool, AuthError> {
        Err(down())
    }

    async fn list_all(&self) -> Result<Vec<PermissionRecord>, AuthError> {
        Err(down())
    }

    async fn list_by_role(&self, _role: &RoleName) -> Result<Vec<PermissionRecord>, AuthError> {
        Err(down())
    }
}
