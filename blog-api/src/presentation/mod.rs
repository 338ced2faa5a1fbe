use std::sync::Arc;

use crate::application::comment_service::CommentService;
use crate::application::federation_service::FederationService;
use crate::application::post_service::PostService;
use crate::application::profile_service::ProfileService;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::identity_repository::PostgresIdentityRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::profile_repository::PostgresProfileRepository;
use crate::domain::identity::ProviderRegistration;
use crate::infrastructure::jwt::SessionTokens;
use crate::infrastructure::oauth::kakao::KakaoClient;
use crate::infrastructure::oauth::naver::NaverClient;

pub(crate) mod http;

/// All request-handling dependencies, constructed once in `main` and never
/// mutated afterwards.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) post_service: Arc<PostService<PostgresPostRepository>>,
    pub(crate) comment_service:
        Arc<CommentService<PostgresCommentRepository, PostgresPostRepository>>,
    pub(crate) profile_service: Arc<ProfileService<PostgresProfileRepository>>,
    pub(crate) federation_service: Arc<FederationService<PostgresIdentityRepository>>,
    pub(crate) tokens: Arc<SessionTokens>,
    pub(crate) kakao: Arc<KakaoClient>,
    pub(crate) naver: Arc<NaverClient>,
    pub(crate) kakao_registration: ProviderRegistration,
    pub(crate) naver_registration: ProviderRegistration,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        post_service: Arc<PostService<PostgresPostRepository>>,
        comment_service: Arc<CommentService<PostgresCommentRepository, PostgresPostRepository>>,
        profile_service: Arc<ProfileService<PostgresProfileRepository>>,
        federation_service: Arc<FederationService<PostgresIdentityRepository>>,
        tokens: Arc<SessionTokens>,
        kakao: Arc<KakaoClient>,
        naver: Arc<NaverClient>,
        kakao_registration: ProviderRegistration,
        naver_registration: ProviderRegistration,
    ) -> Self {
        Self {
            post_service,
            comment_service,
            profile_service,
            federation_service,
            tokens,
            kakao,
            naver,
            kakao_registration,
            naver_registration,
        }
    }
}
