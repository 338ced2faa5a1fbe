use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::data::post_repository::{
    NewPost, Pagination, PostListFilter, PostPatch, PostRepository, PostSortBy, SortOrder,
};
use crate::domain::error::DomainError;
use crate::domain::post::{
    CreatePostRequest, Post, PostStatus, PostSummary, UpdatePostRequest, extract_summary,
};

#[derive(Debug, Clone, Default)]
pub(crate) struct ListPostsParams {
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
    pub(crate) sort_by: Option<PostSortBy>,
    pub(crate) sort_order: Option<SortOrder>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) author_id: Option<String>,
    pub(crate) search: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) items: Vec<PostSummary>,
    pub(crate) total: i64,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total_pages: u32,
}

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: &str,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let status = req.status.unwrap_or(PostStatus::Draft);
        let summary = req.summary.or_else(|| extract_summary(&req.content));
        let published_at = (status == PostStatus::Published).then(Utc::now);

        self.repo
            .create(NewPost {
                author_id: author_id.to_string(),
                title: req.title,
                content: req.content,
                summary,
                cover_image_url: req.cover_image_url,
                status,
                published_at,
            })
            .await
    }

    /// Drafts answer NotFound to anyone but their author, so their
    /// existence is indistinguishable from a missing post.
    pub(crate) async fn get_post(&self, id: i64, caller: Option<&str>) -> Result<Post, DomainError> {
        let post = self
            .repo
            .get_live(id)
            .await?
            .ok_or_else(post_not_found)?;

        if post.status == PostStatus::Draft && caller != Some(post.author_id.as_str()) {
            return Err(post_not_found());
        }
        Ok(post)
    }

    pub(crate) async fn list_posts(
        &self,
        params: ListPostsParams,
    ) -> Result<ListPostsResult, DomainError> {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(10).max(1);
        let filter = PostListFilter {
            status: params.status.unwrap_or(PostStatus::Published),
            author_id: params.author_id,
            search: params.search,
            sort_by: params.sort_by.unwrap_or(PostSortBy::CreatedAt),
            sort_order: params.sort_order.unwrap_or(SortOrder::Desc),
        };

        let (items, total) = self.repo.list(filter, Pagination { page, limit }).await?;
        let total_pages = (total as u64).div_ceil(limit as u64) as u32;

        Ok(ListPostsResult {
            items,
            total,
            page,
            limit,
            total_pages,
        })
    }

    pub(crate) async fn update_post(
        &self,
        caller: &str,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let existing = self.repo.ownership(id).await?.ok_or_else(post_not_found)?;
        if existing.author_id != caller {
            return Err(DomainError::Forbidden);
        }

        let mut patch = PostPatch {
            title: req.title,
            cover_image_url: req.cover_image_url,
            ..Default::default()
        };
        if let Some(content) = req.content {
            // content changed without an explicit summary: re-derive
            if req.summary.is_none() {
                patch.summary = Some(extract_summary(&content));
            }
            patch.content = Some(content);
        }
        if let Some(summary) = req.summary {
            patch.summary = Some(Some(summary));
        }
        if let Some(status) = req.status {
            patch.status = Some(status);
            if status == PostStatus::Published && existing.published_at.is_none() {
                patch.published_at = Some(Utc::now());
            }
        }

        self.repo.update(id, patch).await
    }

    pub(crate) async fn delete_post(&self, caller: &str, id: i64) -> Result<(), DomainError> {
        let existing = self.repo.ownership(id).await?.ok_or_else(post_not_found)?;
        if existing.author_id != caller {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.repo.soft_delete(id).await?;
        if !deleted {
            return Err(post_not_found());
        }
        Ok(())
    }

    pub(crate) async fn increment_view(
        &self,
        id: i64,
        viewer_id: Option<&str>,
        viewer_ip: Option<&str>,
    ) -> Result<bool, DomainError> {
        self.repo.increment_view(id, viewer_id, viewer_ip).await
    }
}

/// Detached view counting: the handle is returned for tests but callers
/// drop it; a failed increment is logged and goes nowhere else.
pub(crate) fn spawn_view_increment<R: PostRepository + 'static>(
    service: Arc<PostService<R>>,
    post_id: i64,
    viewer_id: Option<String>,
    viewer_ip: Option<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = service
            .increment_view(post_id, viewer_id.as_deref(), viewer_ip.as_deref())
            .await
        {
            warn!(post_id, error = %err, "failed to increment view count");
        }
    })
}

fn post_not_found() -> DomainError {
    DomainError::NotFound("Post".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    use super::{ListPostsParams, PostService, spawn_view_increment};
    use crate::data::post_repository::{
        NewPost, Pagination, PostListFilter, PostOwnership, PostPatch, PostRepository,
    };
    use crate::domain::error::DomainError;
    use crate::domain::post::{
        CreatePostRequest, Post, PostStatus, PostSummary, UpdatePostRequest,
    };

    #[derive(Clone, Default)]
    struct FakePostRepo {
        create_input: Arc<Mutex<Option<NewPost>>>,
        get_live_result: Arc<Mutex<Option<Post>>>,
        ownership_result: Arc<Mutex<Option<PostOwnership>>>,
        update_call: Arc<Mutex<Option<(i64, PostPatch)>>>,
        delete_result: Arc<Mutex<bool>>,
        list_call: Arc<Mutex<Option<(PostListFilter, Pagination)>>>,
        list_result: Arc<Mutex<(Vec<PostSummary>, i64)>>,
        increment_fails: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create(&self, input: NewPost) -> Result<Post, DomainError> {
            let post = sample_post(1, &input.author_id, input.status);
            *self
                .create_input
                .lock()
                .expect("create_input mutex poisoned") = Some(input);
            Ok(post)
        }

        async fn get_live(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .get_live_result
                .lock()
                .expect("get_live_result mutex poisoned")
                .clone())
        }

        async fn exists_live(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(true)
        }

        async fn ownership(&self, _id: i64) -> Result<Option<PostOwnership>, DomainError> {
            Ok(self
                .ownership_result
                .lock()
                .expect("ownership_result mutex poisoned")
                .clone())
        }

        async fn update(&self, id: i64, patch: PostPatch) -> Result<Post, DomainError> {
            *self
                .update_call
                .lock()
                .expect("update_call mutex poisoned") = Some((id, patch));
            Ok(sample_post(id, "author-1", PostStatus::Published))
        }

        async fn soft_delete(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(*self
                .delete_result
                .lock()
                .expect("delete_result mutex poisoned"))
        }

        async fn list(
            &self,
            filter: PostListFilter,
            pagination: Pagination,
        ) -> Result<(Vec<PostSummary>, i64), DomainError> {
            *self.list_call.lock().expect("list_call mutex poisoned") =
                Some((filter, pagination));
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn increment_view(
            &self,
            _id: i64,
            _viewer_id: Option<&str>,
            _viewer_ip: Option<&str>,
        ) -> Result<bool, DomainError> {
            if *self
                .increment_fails
                .lock()
                .expect("increment_fails mutex poisoned")
            {
                return Err(DomainError::Unexpected("increment exploded".to_string()));
            }
            Ok(true)
        }
    }

    fn sample_post(id: i64, author_id: &str, status: PostStatus) -> Post {
        Post {
            id,
            author_id: author_id.to_string(),
            title: "Title".to_string(),
            content: json!({"type": "text", "text": "body"}),
            summary: Some("body".to_string()),
            cover_image_url: None,
            status,
            views_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            published_at: (status == PostStatus::Published).then(Utc::now),
            deleted_at: None,
            author: None,
        }
    }

    fn sample_summary(id: i64) -> PostSummary {
        PostSummary {
            id,
            author_id: "author-1".to_string(),
            title: "Title".to_string(),
            summary: None,
            cover_image_url: None,
            status: PostStatus::Published,
            views_count: 0,
            created_at: Utc::now(),
            published_at: Some(Utc::now()),
            author: None,
        }
    }

    fn create_request(status: Option<PostStatus>) -> CreatePostRequest {
        CreatePostRequest {
            title: "Title".to_string(),
            content: json!({"type": "text", "text": "a very long piece of text"}),
            summary: None,
            cover_image_url: None,
            status,
        }
    }

    #[tokio::test]
    async fn create_post_derives_summary_and_stamps_published_at() {
        let repo = FakePostRepo::default();
        let service = PostService::new(repo.clone());

        service
            .create_post("author-1", create_request(Some(PostStatus::Published)))
            .await
            .expect("create must succeed");

        let input = repo
            .create_input
            .lock()
            .expect("create_input mutex poisoned")
            .clone()
            .expect("create must be captured");
        assert_eq!(input.summary.as_deref(), Some("a very lon..."));
        assert_eq!(input.status, PostStatus::Published);
        assert!(input.published_at.is_some());
    }

    #[tokio::test]
    async fn create_post_defaults_to_unpublished_draft() {
        let repo = FakePostRepo::default();
        let service = PostService::new(repo.clone());

        service
            .create_post("author-1", create_request(None))
            .await
            .expect("create must succeed");

        let input = repo
            .create_input
            .lock()
            .expect("create_input mutex poisoned")
            .clone()
            .expect("create must be captured");
        assert_eq!(input.status, PostStatus::Draft);
        assert!(input.published_at.is_none());
    }

    #[tokio::test]
    async fn get_post_hides_draft_from_non_author() {
        let repo = FakePostRepo::default();
        *repo
            .get_live_result
            .lock()
            .expect("get_live_result mutex poisoned") =
            Some(sample_post(7, "author-1", PostStatus::Draft));
        let service = PostService::new(repo);

        let err = service
            .get_post(7, None)
            .await
            .expect_err("anonymous caller must not see a draft");
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = service
            .get_post(7, Some("someone-else"))
            .await
            .expect_err("other caller must not see a draft");
        assert!(matches!(err, DomainError::NotFound(_)));

        let post = service
            .get_post(7, Some("author-1"))
            .await
            .expect("author must see their draft");
        assert_eq!(post.id, 7);
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let service = PostService::new(FakePostRepo::default());
        let err = service
            .get_post(42, None)
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_post_is_forbidden_for_non_owner() {
        let repo = FakePostRepo::default();
        *repo
            .ownership_result
            .lock()
            .expect("ownership_result mutex poisoned") = Some(PostOwnership {
            author_id: "author-1".to_string(),
            published_at: None,
        });
        let service = PostService::new(repo);

        let err = service
            .update_post("intruder", 7, UpdatePostRequest::default())
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn publishing_sets_published_at_exactly_once() {
        let repo = FakePostRepo::default();
        *repo
            .ownership_result
            .lock()
            .expect("ownership_result mutex poisoned") = Some(PostOwnership {
            author_id: "author-1".to_string(),
            published_at: None,
        });
        let service = PostService::new(repo.clone());

        let req = UpdatePostRequest {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        service
            .update_post("author-1", 7, req.clone())
            .await
            .expect("publish must succeed");

        let (_, patch) = repo
            .update_call
            .lock()
            .expect("update_call mutex poisoned")
            .clone()
            .expect("update must be captured");
        let first_published_at = patch.published_at.expect("first publish must stamp");

        // already published: a repeated publish must not restamp
        *repo
            .ownership_result
            .lock()
            .expect("ownership_result mutex poisoned") = Some(PostOwnership {
            author_id: "author-1".to_string(),
            published_at: Some(first_published_at),
        });
        service
            .update_post("author-1", 7, req)
            .await
            .expect("second publish must succeed");

        let (_, patch) = repo
            .update_call
            .lock()
            .expect("update_call mutex poisoned")
            .clone()
            .expect("update must be captured");
        assert_eq!(patch.status, Some(PostStatus::Published));
        assert!(patch.published_at.is_none());
    }

    #[tokio::test]
    async fn update_rederives_summary_when_content_changes() {
        let repo = FakePostRepo::default();
        *repo
            .ownership_result
            .lock()
            .expect("ownership_result mutex poisoned") = Some(PostOwnership {
            author_id: "author-1".to_string(),
            published_at: None,
        });
        let service = PostService::new(repo.clone());

        let req = UpdatePostRequest {
            content: Some(json!({"type": "text", "text": "fresh"})),
            ..Default::default()
        };
        service
            .update_post("author-1", 7, req)
            .await
            .expect("update must succeed");

        let (_, patch) = repo
            .update_call
            .lock()
            .expect("update_call mutex poisoned")
            .clone()
            .expect("update must be captured");
        assert_eq!(patch.summary, Some(Some("fresh".to_string())));
    }

    #[tokio::test]
    async fn update_keeps_explicit_summary_over_derived_one() {
        let repo = FakePostRepo::default();
        *repo
            .ownership_result
            .lock()
            .expect("ownership_result mutex poisoned") = Some(PostOwnership {
            author_id: "author-1".to_string(),
            published_at: None,
        });
        let service = PostService::new(repo.clone());

        let req = UpdatePostRequest {
            content: Some(json!({"type": "text", "text": "fresh"})),
            summary: Some("hand-written".to_string()),
            ..Default::default()
        };
        service
            .update_post("author-1", 7, req)
            .await
            .expect("update must succeed");

        let (_, patch) = repo
            .update_call
            .lock()
            .expect("update_call mutex poisoned")
            .clone()
            .expect("update must be captured");
        assert_eq!(patch.summary, Some(Some("hand-written".to_string())));
    }

    #[tokio::test]
    async fn delete_post_answers_not_found_for_already_deleted_post() {
        let repo = FakePostRepo::default();
        // ownership misses: the row is gone or soft-deleted
        let service = PostService::new(repo);

        let err = service
            .delete_post("author-1", 7)
            .await
            .expect_err("re-delete must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_post_is_forbidden_for_non_owner() {
        let repo = FakePostRepo::default();
        *repo
            .ownership_result
            .lock()
            .expect("ownership_result mutex poisoned") = Some(PostOwnership {
            author_id: "author-1".to_string(),
            published_at: None,
        });
        let service = PostService::new(repo);

        let err = service
            .delete_post("intruder", 7)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn list_posts_defaults_to_published_and_computes_total_pages() {
        let repo = FakePostRepo::default();
        *repo
            .list_result
            .lock()
            .expect("list_result mutex poisoned") =
            ((21..=25).map(sample_summary).collect(), 25);
        let service = PostService::new(repo.clone());

        let result = service
            .list_posts(ListPostsParams {
                page: Some(3),
                ..Default::default()
            })
            .await
            .expect("list must succeed");

        assert_eq!(result.items.len(), 5);
        assert_eq!(result.total, 25);
        assert_eq!(result.page, 3);
        assert_eq!(result.limit, 10);
        assert_eq!(result.total_pages, 3);

        let (filter, pagination) = repo
            .list_call
            .lock()
            .expect("list_call mutex poisoned")
            .clone()
            .expect("list must be captured");
        assert_eq!(filter.status, PostStatus::Published);
        assert_eq!(pagination.offset(), 20);
    }

    #[tokio::test]
    async fn view_increment_failure_never_reaches_the_caller() {
        let repo = FakePostRepo::default();
        *repo
            .increment_fails
            .lock()
            .expect("increment_fails mutex poisoned") = true;
        let service = Arc::new(PostService::new(repo));

        let handle = spawn_view_increment(service, 7, Some("viewer".to_string()), None);
        handle.await.expect("detached task must not panic");
    }
}
