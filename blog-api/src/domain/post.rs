use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DomainError;
use super::profile::AuthorRef;

/// Maximum number of characters kept when deriving a summary from content.
pub(crate) const SUMMARY_MAX_CHARS: usize = 10;

pub(crate) const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub(crate) fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(DomainError::Unexpected(format!(
                "unknown post status '{raw}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) content: Value,
    pub(crate) summary: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) views_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
    pub(crate) author: Option<AuthorRef>,
}

/// Listing projection: no content body, author joined in.
#[derive(Debug, Clone)]
pub(crate) struct PostSummary {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) summary: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) views_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) author: Option<AuthorRef>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: Value,
    pub(crate) summary: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: Option<PostStatus>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        require_object("content", &self.content)?;
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: self.content,
            summary: normalize_optional(self.summary),
            cover_image_url: normalize_optional(self.cover_image_url),
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<Value>,
    pub(crate) summary: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) status: Option<PostStatus>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = self
            .title
            .map(|title| normalize_title(&title))
            .transpose()?;
        if let Some(content) = &self.content {
            require_object("content", content)?;
        }
        Ok(Self {
            title,
            content: self.content,
            summary: normalize_optional(self.summary),
            cover_image_url: normalize_optional(self.cover_image_url),
            status: self.status,
        })
    }
}

/// Derive a summary from a `{type: "text", text}` content payload: trimmed,
/// truncated to [`SUMMARY_MAX_CHARS`] with an ellipsis marker. Any other
/// content shape yields no summary.
pub(crate) fn extract_summary(content: &Value) -> Option<String> {
    if content.get("type").and_then(Value::as_str) != Some("text") {
        return None;
    }
    let text = content.get("text")?.as_str()?.trim();
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return Some(text.to_string());
    }
    let truncated: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    Some(format!("{truncated}..."))
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..200 chars",
        });
    }
    Ok(title.to_string())
}

fn require_object(field: &'static str, value: &Value) -> Result<(), DomainError> {
    if !value.is_object() {
        return Err(DomainError::Validation {
            field,
            message: "must be an object",
        });
    }
    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
