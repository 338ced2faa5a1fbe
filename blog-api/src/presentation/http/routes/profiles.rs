use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::profiles::{get_my_profile, update_my_profile};
use crate::presentation::http::middleware::auth::require_auth;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_my_profile).put(update_my_profile))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
