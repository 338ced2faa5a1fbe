use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::auth::{
    FederatedLoginDto, FederatedUserDto, KakaoLoginDto, NaverLoginDto,
};
use crate::presentation::http::handlers::comments::{
    CommentDto, CreateCommentDto, UpdateCommentDto,
};
use crate::presentation::http::handlers::health::HealthDto;
use crate::presentation::http::handlers::posts::{
    AuthorDto, CreatePostDto, ListPostsQuery, ListPostsResponseDto, PostDto, PostSortByDto,
    PostStatusDto, PostSummaryDto, SortOrderDto, UpdatePostDto,
};
use crate::presentation::http::handlers::profiles::{ProfileDto, RoleDto, UpdateProfileDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::health,
        crate::presentation::http::handlers::auth::kakao_login,
        crate::presentation::http::handlers::auth::naver_login,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::comments::create_comment,
        crate::presentation::http::handlers::comments::list_comments,
        crate::presentation::http::handlers::comments::update_comment,
        crate::presentation::http::handlers::comments::delete_comment,
        crate::presentation::http::handlers::profiles::get_my_profile,
        crate::presentation::http::handlers::profiles::update_my_profile
    ),
    components(
        schemas(
            HealthDto,
            KakaoLoginDto,
            NaverLoginDto,
            FederatedLoginDto,
            FederatedUserDto,
            CreatePostDto,
            UpdatePostDto,
            ListPostsQuery,
            PostStatusDto,
            PostSortByDto,
            SortOrderDto,
            AuthorDto,
            PostDto,
            PostSummaryDto,
            ListPostsResponseDto,
            CreateCommentDto,
            UpdateCommentDto,
            CommentDto,
            UpdateProfileDto,
            ProfileDto,
            RoleDto
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Social login endpoints"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Comment endpoints"),
        (name = "profiles", description = "Profile endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
