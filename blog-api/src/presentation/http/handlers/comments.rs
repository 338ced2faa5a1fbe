use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::{Comment, CreateCommentRequest, UpdateCommentRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::envelope::ApiResponse;
use crate::presentation::http::handlers::posts::AuthorDto;
use crate::presentation::http::middleware::auth::CurrentUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub(crate) content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: String,
    pub(crate) parent_id: Option<i64>,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) author: Option<AuthorDto>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            author: comment.author.map(AuthorDto::from),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{postId}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("postId" = i64, Path, description = "Post id")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<CommentDto>>)> {
    dto.validate()?;

    state
        .profile_service
        .get_or_create(
            &user.uid,
            user.email.as_deref(),
            user.display_name.as_deref(),
            user.avatar_url.as_deref(),
        )
        .await?;

    let req = CreateCommentRequest {
        content: dto.content,
        parent_id: dto.parent_id,
    };
    let comment = state
        .comment_service
        .create_comment(&user.uid, post_id, req)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CommentDto::from(comment))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{postId}/comments",
    tag = "comments",
    params(
        ("postId" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Comments listed oldest first", body = Vec<CommentDto>),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<CommentDto>>>)> {
    let comments = state.comment_service.list_comments(post_id).await?;
    let items = comments.into_iter().map(CommentDto::from).collect();

    Ok((StatusCode::OK, Json(ApiResponse::ok(items))))
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateCommentDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<CommentDto>>)> {
    dto.validate()?;

    let req = UpdateCommentRequest {
        content: dto.content,
    };
    let comment = state
        .comment_service
        .update_comment(&user.uid, id, req)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(CommentDto::from(comment))),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    state.comment_service.delete_comment(&user.uid, id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message("Comment deleted")),
    ))
}
