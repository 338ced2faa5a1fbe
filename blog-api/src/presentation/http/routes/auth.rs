use axum::{Router, routing::post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{kakao_login, naver_login};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/kakao", post(kakao_login))
        .route("/naver", post(naver_login))
}
