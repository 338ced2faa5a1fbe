use axum::{Json, Router, http::StatusCode};

use super::AppState;
use self::envelope::ApiResponse;

pub(crate) mod app_error;
pub(crate) mod envelope;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) fn routes(state: AppState) -> Router {
    routes::router(state.clone())
        .fallback(fallback_not_found)
        .with_state(state)
}

async fn fallback_not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::failure("Not Found")))
}
