mod common;

use axum::http::StatusCode;
use common::{ADMIN, FailingStore, STAFF, read_json, request, state_with_store, test_state};
use serde_json::json;
use server_http::build_router;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn origins() -> Vec<String> {
    vec!["*".to_string()]
}

#[tokio::test]
async fn test_health_is_public() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_router(test_state(&temp_dir).await, &origins());

    let response = app
        .oneshot(request("GET", "/api/health", None, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["ok"], true);
}

#[tokio::test]
async fn test_missing_or_bad_credentials_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_router(test_state(&temp_dir).await, &origins());

    let response = app
        .clone()
        .oneshot(request("GET", "/api/modules", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request(
            "GET",
            "/api/modules",
            Some((STAFF.0, "wrongpass1")),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_permission_changes_apply_to_the_next_request() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_router(test_state(&temp_dir).await, &origins());

    // No record for (staff, users): denied.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/users", Some(STAFF), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/permissions/staff/users",
            Some(ADMIN),
            Some(json!({ "actions": ["read"] })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["actions"], json!(["read"]));

    // The cached denial was invalidated by the write.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/users", Some(STAFF), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["users"].as_array().unwrap().len(), 2);

    // read does not imply create
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/users",
            Some(STAFF),
            Some(json!({ "username": "tech", "password": "tech2024", "role": "staff" })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            "/api/permissions/staff/users",
            Some(ADMIN),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", "/api/users", Some(STAFF), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_bypasses_records() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_router(test_state(&temp_dir).await, &origins());

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/users",
            Some(ADMIN),
            Some(json!({ "username": "tech", "password": "tech2024", "role": "staff" })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json(response).await["role"], "staff");

    let response = app
        .oneshot(request("GET", "/api/permissions/me", Some(ADMIN), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["elevated"], true);
    assert_eq!(
        body["modules"]["employees"],
        json!(["create", "delete", "read", "update"])
    );
}

#[tokio::test]
async fn test_permission_admin_requires_elevated_role() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_router(test_state(&temp_dir).await, &origins());

    for (method, uri, body) in [
        ("GET", "/api/permissions", None),
        ("POST", "/api/permissions/reload", None),
        (
            "PUT",
            "/api/permissions/staff/employees",
            Some(json!({ "actions": ["read", "update", "delete"] })),
        ),
    ] {
        let response = app
            .clone()
            .oneshot(request(method, uri, Some(STAFF), body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_invalid_permission_writes_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_router(test_state(&temp_dir).await, &origins());

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/permissions/admin/employees",
            Some(ADMIN),
            Some(json!({ "actions": ["read"] })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/permissions/st%24ff/employees",
            Some(ADMIN),
            Some(json!({ "actions": ["read"] })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            "/api/permissions/staff/billing",
            Some(ADMIN),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("GET", "/api/permissions", Some(ADMIN), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_json(response).await["permissions"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_staff_sees_resolved_actions() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir).await;
    state
        .permission_service
        .initialize_default_permissions()
        .await
        .unwrap();
    let app = build_router(state.clone(), &origins());

    let response = app
        .oneshot(request("GET", "/api/permissions/me", Some(STAFF), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["role"], "staff");
    assert_eq!(body["elevated"], false);
    assert_eq!(body["modules"]["assets"], json!(["read"]));
    assert_eq!(body["modules"]["users"], json!([]));

    // One entry per catalogue module is now cached.
    assert_eq!(
        state.resolver.len(),
        itroom::auth::defaults::module_catalogue().len()
    );
}

#[tokio::test]
async fn test_store_outage_is_a_server_error_not_a_denial() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FailingStore::default());
    let state = state_with_store(&temp_dir, store).await;
    let app = build_router(state, &origins());

    let response = app
        .clone()
        .oneshot(request("GET", "/api/users", Some(STAFF), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The elevated role does not depend on the store.
    let response = app
        .oneshot(request("GET", "/api/users", Some(ADMIN), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_user_admins_cannot_manage_elevated_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_router(test_state(&temp_dir).await, &origins());

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/permissions/staff/users",
            Some(ADMIN),
            Some(json!({ "actions": ["read", "create", "delete"] })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/users",
            Some(STAFF),
            Some(json!({ "username": "evil", "password": "evil2024", "role": "admin" })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The refused account does not exist
    let response = app
        .clone()
        .oneshot(request("GET", "/api/permissions", Some(("evil", "evil2024")), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/users/admin", Some(STAFF), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff accounts remain manageable
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/users",
            Some(STAFF),
            Some(json!({ "username": "tech", "password": "tech2024", "role": "staff" })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("GET", "/api/users", Some(ADMIN), None))
        .await
        .expect("response");
    assert_eq!(read_json(response).await["users"].as_array().unwrap().len(), 3);
}
