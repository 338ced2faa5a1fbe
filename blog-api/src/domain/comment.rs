use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::profile::AuthorRef;

pub(crate) const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: String,
    pub(crate) parent_id: Option<i64>,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
    pub(crate) author: Option<AuthorRef>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
            parent_id: self.parent_id,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdateCommentRequest {
    pub(crate) content: String,
}

impl UpdateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
        })
    }
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > MAX_COMMENT_CHARS {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be 1..2000 chars",
        });
    }
    Ok(content.to_string())
}
