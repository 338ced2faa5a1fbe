use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CreateCommentRequest, UpdateCommentRequest};
use crate::domain::error::DomainError;

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    pub(crate) async fn create_comment(
        &self,
        author_id: &str,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        if !self.posts.exists_live(post_id).await? {
            return Err(DomainError::NotFound("Post".to_string()));
        }

        self.comments
            .create(NewComment {
                post_id,
                author_id: author_id.to_string(),
                parent_id: req.parent_id,
                content: req.content,
            })
            .await
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        self.comments.list_for_post(post_id).await
    }

    pub(crate) async fn update_comment(
        &self,
        caller: &str,
        id: i64,
        req: UpdateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.check_ownership(caller, id).await?;
        self.comments.update_content(id, &req.content).await
    }

    pub(crate) async fn delete_comment(&self, caller: &str, id: i64) -> Result<(), DomainError> {
        self.check_ownership(caller, id).await?;

        let deleted = self.comments.soft_delete(id).await?;
        if !deleted {
            return Err(DomainError::NotFound("Comment".to_string()));
        }
        Ok(())
    }

    async fn check_ownership(&self, caller: &str, id: i64) -> Result<(), DomainError> {
        let author_id = self
            .comments
            .author_of_live(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Comment".to_string()))?;
        if author_id != caller {
            return Err(DomainError::Forbidden);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::CommentService;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{
        NewPost, Pagination, PostListFilter, PostOwnership, PostPatch, PostRepository,
    };
    use crate::domain::comment::{Comment, CreateCommentRequest, UpdateCommentRequest};
    use crate::domain::error::DomainError;
    use crate::domain::post::{Post, PostSummary};

    #[derive(Clone, Default)]
    struct FakeCommentRepo {
        create_input: Arc<Mutex<Option<NewComment>>>,
        author_result: Arc<Mutex<Option<String>>>,
        delete_result: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl CommentRepository for FakeCommentRepo {
        async fn create(&self, input: NewComment) -> Result<Comment, DomainError> {
            let comment = sample_comment(1, input.post_id, &input.author_id, &input.content);
            *self
                .create_input
                .lock()
                .expect("create_input mutex poisoned") = Some(input);
            Ok(comment)
        }

        async fn list_for_post(&self, _post_id: i64) -> Result<Vec<Comment>, DomainError> {
            Ok(Vec::new())
        }

        async fn author_of_live(&self, _id: i64) -> Result<Option<String>, DomainError> {
            Ok(self
                .author_result
                .lock()
                .expect("author_result mutex poisoned")
                .clone())
        }

        async fn update_content(&self, id: i64, content: &str) -> Result<Comment, DomainError> {
            Ok(sample_comment(id, 7, "author-1", content))
        }

        async fn soft_delete(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(*self
                .delete_result
                .lock()
                .expect("delete_result mutex poisoned"))
        }
    }

    #[derive(Clone)]
    struct FakePostRepo {
        exists_result: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create(&self, _input: NewPost) -> Result<Post, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn get_live(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(None)
        }

        async fn exists_live(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(*self
                .exists_result
                .lock()
                .expect("exists_result mutex poisoned"))
        }

        async fn ownership(&self, _id: i64) -> Result<Option<PostOwnership>, DomainError> {
            Ok(None)
        }

        async fn update(&self, _id: i64, _patch: PostPatch) -> Result<Post, DomainError> {
            unimplemented!("not used by comment tests")
        }

        async fn soft_delete(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn list(
            &self,
            _filter: PostListFilter,
            _pagination: Pagination,
        ) -> Result<(Vec<PostSummary>, i64), DomainError> {
            Ok((Vec::new(), 0))
        }

        async fn increment_view(
            &self,
            _id: i64,
            _viewer_id: Option<&str>,
            _viewer_ip: Option<&str>,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    fn sample_comment(id: i64, post_id: i64, author_id: &str, content: &str) -> Comment {
        Comment {
            id,
            post_id,
            author_id: author_id.to_string(),
            parent_id: None,
            content: content.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
            author: None,
        }
    }

    fn service(post_exists: bool) -> (FakeCommentRepo, CommentService<FakeCommentRepo, FakePostRepo>) {
        let comments = FakeCommentRepo::default();
        let posts = FakePostRepo {
            exists_result: Arc::new(Mutex::new(post_exists)),
        };
        (comments.clone(), CommentService::new(comments, posts))
    }

    #[tokio::test]
    async fn create_comment_requires_a_live_post() {
        let (_, service) = service(false);

        let err = service
            .create_comment(
                "author-1",
                7,
                CreateCommentRequest {
                    content: "hello".to_string(),
                    parent_id: None,
                },
            )
            .await
            .expect_err("dead post must be rejected");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_comment_stores_normalized_content() {
        let (comments, service) = service(true);

        service
            .create_comment(
                "author-1",
                7,
                CreateCommentRequest {
                    content: "  hello  ".to_string(),
                    parent_id: Some(3),
                },
            )
            .await
            .expect("create must succeed");

        let input = comments
            .create_input
            .lock()
            .expect("create_input mutex poisoned")
            .clone()
            .expect("create must be captured");
        assert_eq!(input.content, "hello");
        assert_eq!(input.parent_id, Some(3));
        assert_eq!(input.post_id, 7);
    }

    #[tokio::test]
    async fn update_comment_is_forbidden_for_non_owner() {
        let (comments, service) = service(true);
        *comments
            .author_result
            .lock()
            .expect("author_result mutex poisoned") = Some("author-1".to_string());

        let err = service
            .update_comment(
                "intruder",
                1,
                UpdateCommentRequest {
                    content: "edited".to_string(),
                },
            )
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn delete_comment_answers_not_found_for_deleted_comment() {
        let (_, service) = service(true);

        let err = service
            .delete_comment("author-1", 1)
            .await
            .expect_err("missing comment must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_comment_succeeds_for_owner() {
        let (comments, service) = service(true);
        *comments
            .author_result
            .lock()
            .expect("author_result mutex poisoned") = Some("author-1".to_string());
        *comments
            .delete_result
            .lock()
            .expect("delete_result mutex poisoned") = true;

        service
            .delete_comment("author-1", 1)
            .await
            .expect("delete must succeed");
    }
}
