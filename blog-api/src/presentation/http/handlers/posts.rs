use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::post_service::{ListPostsParams, ListPostsResult, spawn_view_increment};
use crate::data::post_repository::{PostSortBy, SortOrder};
use crate::domain::post::{
    CreatePostRequest, Post, PostStatus, PostSummary, UpdatePostRequest,
};
use crate::domain::profile::AuthorRef;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::envelope::ApiResponse;
use crate::presentation::http::middleware::auth::{CurrentUser, MaybeUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatusDto {
    Draft,
    Published,
}

impl From<PostStatusDto> for PostStatus {
    fn from(status: PostStatusDto) -> Self {
        match status {
            PostStatusDto::Draft => PostStatus::Draft,
            PostStatusDto::Published => PostStatus::Published,
        }
    }
}

impl From<PostStatus> for PostStatusDto {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => PostStatusDto::Draft,
            PostStatus::Published => PostStatusDto::Published,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PostSortByDto {
    CreatedAt,
    ViewsCount,
    PublishedAt,
}

impl From<PostSortByDto> for PostSortBy {
    fn from(sort_by: PostSortByDto) -> Self {
        match sort_by {
            PostSortByDto::CreatedAt => PostSortBy::CreatedAt,
            PostSortByDto::ViewsCount => PostSortBy::ViewsCount,
            PostSortByDto::PublishedAt => PostSortBy::PublishedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortOrderDto {
    Asc,
    Desc,
}

impl From<SortOrderDto> for SortOrder {
    fn from(order: SortOrderDto) -> Self {
        match order {
            SortOrderDto::Asc => SortOrder::Asc,
            SortOrderDto::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    #[schema(value_type = Object)]
    pub(crate) content: Value,
    #[validate(length(min = 1, max = 500))]
    pub(crate) summary: Option<String>,
    #[validate(length(min = 1, max = 2048))]
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: Option<PostStatusDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: Option<String>,
    #[schema(value_type = Object)]
    pub(crate) content: Option<Value>,
    #[validate(length(min = 1, max = 500))]
    pub(crate) summary: Option<String>,
    #[validate(length(min = 1, max = 2048))]
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: Option<PostStatusDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListPostsQuery {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    pub(crate) sort_by: Option<PostSortByDto>,
    pub(crate) sort_order: Option<SortOrderDto>,
    pub(crate) status: Option<PostStatusDto>,
    pub(crate) author_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub(crate) search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorDto {
    pub(crate) id: String,
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

impl From<AuthorRef> for AuthorDto {
    fn from(author: AuthorRef) -> Self {
        Self {
            id: author.id,
            display_name: author.display_name,
            avatar_url: author.avatar_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) title: String,
    #[schema(value_type = Object)]
    pub(crate) content: Value,
    pub(crate) summary: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: PostStatusDto,
    pub(crate) views_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) author: Option<AuthorDto>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            summary: post.summary,
            cover_image_url: post.cover_image_url,
            status: post.status.into(),
            views_count: post.views_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            published_at: post.published_at,
            deleted_at: post.deleted_at,
            author: post.author.map(AuthorDto::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostSummaryDto {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) summary: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: PostStatusDto,
    pub(crate) views_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) author: Option<AuthorDto>,
}

impl From<PostSummary> for PostSummaryDto {
    fn from(summary: PostSummary) -> Self {
        Self {
            id: summary.id,
            author_id: summary.author_id,
            title: summary.title,
            summary: summary.summary,
            cover_image_url: summary.cover_image_url,
            status: summary.status.into(),
            views_count: summary.views_count,
            created_at: summary.created_at,
            published_at: summary.published_at,
            author: summary.author.map(AuthorDto::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListPostsResponseDto {
    pub(crate) items: Vec<PostSummaryDto>,
    pub(crate) total: i64,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total_pages: u32,
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            items: result.items.into_iter().map(PostSummaryDto::from).collect(),
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<PostDto>>)> {
    dto.validate()?;

    // make sure the author row exists before the posts FK needs it
    state
        .profile_service
        .get_or_create(
            &user.uid,
            user.email.as_deref(),
            user.display_name.as_deref(),
            user.avatar_url.as_deref(),
        )
        .await?;

    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        summary: dto.summary,
        cover_image_url: dto.cover_image_url,
        status: dto.status.map(PostStatus::from),
    };
    let post = state.post_service.create_post(&user.uid, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PostDto::from(post))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "Page number (>= 1, default 1)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100, default 10)"),
        ("sortBy" = Option<String>, Query, description = "created_at | views_count | published_at"),
        ("sortOrder" = Option<String>, Query, description = "asc | desc"),
        ("status" = Option<String>, Query, description = "draft | published"),
        ("authorId" = Option<String>, Query, description = "Filter by author"),
        ("search" = Option<String>, Query, description = "Case-insensitive title search")
    ),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<(StatusCode, Json<ApiResponse<ListPostsResponseDto>>)> {
    query.validate()?;

    let status = effective_status(
        query.status,
        query.author_id.as_deref(),
        user.as_ref().map(|u| u.uid.as_str()),
    );

    let params = ListPostsParams {
        page: query.page,
        limit: query.limit,
        sort_by: query.sort_by.map(PostSortBy::from),
        sort_order: query.sort_order.map(SortOrder::from),
        status: status.map(PostStatus::from),
        author_id: query.author_id,
        search: query.search,
    };
    let result = state.post_service.list_posts(params).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(ListPostsResponseDto::from(result))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<ApiResponse<PostDto>>)> {
    let caller = user.as_ref().map(|u| u.uid.as_str());
    let post = state.post_service.get_post(id, caller).await?;

    // detached: the response never waits on (or fails with) the counter
    let viewer_id = caller.map(str::to_string);
    let viewer_ip = client_ip(&headers, addr);
    let _ = spawn_view_increment(state.post_service.clone(), id, viewer_id, Some(viewer_ip));

    Ok((StatusCode::OK, Json(ApiResponse::ok(PostDto::from(post)))))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<PostDto>>)> {
    dto.validate()?;

    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        summary: dto.summary,
        cover_image_url: dto.cover_image_url,
        status: dto.status.map(PostStatus::from),
    };
    let post = state.post_service.update_post(&user.uid, id, req).await?;

    Ok((StatusCode::OK, Json(ApiResponse::ok(PostDto::from(post)))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    state.post_service.delete_post(&user.uid, id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message("Post deleted")),
    ))
}

/// Drafts are only listable by their author: the `draft` filter survives
/// only when the query's author filter names the caller, anything else is
/// silently downgraded to the published feed.
fn effective_status(
    requested: Option<PostStatusDto>,
    author_filter: Option<&str>,
    caller: Option<&str>,
) -> Option<PostStatusDto> {
    if requested != Some(PostStatusDto::Draft) {
        return requested;
    }
    match (author_filter, caller) {
        (Some(author), Some(uid)) if author == uid => Some(PostStatusDto::Draft),
        _ => Some(PostStatusDto::Published),
    }
}

fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| addr.ip().to_string())
}
