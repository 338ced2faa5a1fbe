use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::presentation::http::envelope::ApiResponse;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthDto {
    pub(crate) status: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthDto)
    )
)]
pub(crate) async fn health() -> Json<ApiResponse<HealthDto>> {
    Json(ApiResponse::ok(HealthDto { status: "ok" }))
}
