use crate::api::HealthResponse;
use axum::Json;

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
