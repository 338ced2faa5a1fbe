use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{create_comment, list_comments};
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_posts, update_post,
};
use crate::presentation::http::middleware::auth::{optional_auth, require_auth};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    // comment listing takes no credential at all
    let open = Router::new().route("/{id}/comments", get(list_comments));

    let optional = Router::new()
        .route("/", get(list_posts))
        .route("/{id}", get(get_post))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth,
        ));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route("/{id}/comments", post(create_comment))
        .layer(middleware::from_fn_with_state(state, require_auth));

    open.merge(optional).merge(protected)
}
