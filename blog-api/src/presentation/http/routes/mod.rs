use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::health;

pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod profiles;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new().nest(
        "/api/v1",
        Router::new()
            .route("/health", get(health))
            .nest("/auth", auth::router())
            .nest("/posts", posts::router(state.clone()))
            .nest("/comments", comments::router(state.clone()))
            .nest("/profiles", profiles::router(state)),
    )
}
