use async_trait::async_trait;

use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) author_id: String,
    pub(crate) parent_id: Option<i64>,
    pub(crate) content: String,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create(&self, input: NewComment) -> Result<Comment, DomainError>;

    /// All live comments of a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError>;

    /// Author id of a non-deleted comment, for the ownership check.
    async fn author_of_live(&self, id: i64) -> Result<Option<String>, DomainError>;

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment, DomainError>;

    async fn soft_delete(&self, id: i64) -> Result<bool, DomainError>;
}
