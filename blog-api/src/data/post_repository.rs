use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus, PostSummary};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) content: Value,
    pub(crate) summary: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

/// Staged column updates. `None` leaves a column untouched; `summary` is
/// double-wrapped because a derived summary may legitimately clear the
/// stored one.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<Value>,
    pub(crate) summary: Option<Option<String>>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

/// Owner-relevant fields of a live (non-deleted) post.
#[derive(Debug, Clone)]
pub(crate) struct PostOwnership {
    pub(crate) author_id: String,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostSortBy {
    CreatedAt,
    ViewsCount,
    PublishedAt,
}

impl PostSortBy {
    pub(crate) fn column(self) -> &'static str {
        match self {
            PostSortBy::CreatedAt => "created_at",
            PostSortBy::ViewsCount => "views_count",
            PostSortBy::PublishedAt => "published_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub(crate) struct PostListFilter {
    pub(crate) status: PostStatus,
    pub(crate) author_id: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) sort_by: PostSortBy,
    pub(crate) sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

impl Pagination {
    pub(crate) fn offset(self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.limit as i64
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create(&self, input: NewPost) -> Result<Post, DomainError>;

    /// Fetch a non-deleted post with its author joined in.
    async fn get_live(&self, id: i64) -> Result<Option<Post>, DomainError>;

    async fn exists_live(&self, id: i64) -> Result<bool, DomainError>;

    /// Owner fields of a non-deleted post, for the ownership check.
    async fn ownership(&self, id: i64) -> Result<Option<PostOwnership>, DomainError>;

    async fn update(&self, id: i64, patch: PostPatch) -> Result<Post, DomainError>;

    async fn soft_delete(&self, id: i64) -> Result<bool, DomainError>;

    async fn list(
        &self,
        filter: PostListFilter,
        pagination: Pagination,
    ) -> Result<(Vec<PostSummary>, i64), DomainError>;

    /// Delegates to the datastore's deduplicating counter; returns whether
    /// this view was counted.
    async fn increment_view(
        &self,
        id: i64,
        viewer_id: Option<&str>,
        viewer_ip: Option<&str>,
    ) -> Result<bool, DomainError>;
}
