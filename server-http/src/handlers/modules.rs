use crate::api::ListModulesResponse;
use axum::Json;
use itroom::auth::defaults::module_catalogue;

/// GET /api/modules - Module keys permissions can be configured for
pub async fn list_modules() -> Json<ListModulesResponse> {
    Json(ListModulesResponse {
        modules: module_catalogue(),
    })
}
