use std::sync::Arc;

use anyhow::Result;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::comment_service::CommentService;
use application::federation_service::FederationService;
use application::post_service::PostService;
use application::profile_service::ProfileService;
use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::identity_repository::PostgresIdentityRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::profile_repository::PostgresProfileRepository;
use domain::identity::ProviderRegistration;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::SessionTokens;
use infrastructure::logging::init_logging;
use infrastructure::oauth::kakao::KakaoClient;
use infrastructure::oauth::naver::NaverClient;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let tokens = Arc::new(SessionTokens::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));
    let post_service = Arc::new(PostService::new(PostgresPostRepository::new(pool.clone())));
    let comment_service = Arc::new(CommentService::new(
        PostgresCommentRepository::new(pool.clone()),
        PostgresPostRepository::new(pool.clone()),
    ));
    let profile_service = Arc::new(ProfileService::new(PostgresProfileRepository::new(
        pool.clone(),
    )));
    let federation_service = Arc::new(FederationService::new(
        PostgresIdentityRepository::new(pool.clone()),
        tokens.clone(),
    ));
    let kakao = Arc::new(KakaoClient::new(settings.kakao.clone()));
    let naver = Arc::new(NaverClient::new(settings.naver.clone()));

    let state = AppState::new(
        post_service,
        comment_service,
        profile_service,
        federation_service,
        tokens,
        kakao,
        naver,
        ProviderRegistration::kakao(settings.kakao.link_by_verified_email),
        ProviderRegistration::naver(settings.naver.link_by_verified_email),
    );

    server::run_http(&settings, state).await
}
