use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub(crate) const MAX_DISPLAY_NAME_CHARS: usize = 50;
pub(crate) const MAX_BIO_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
    Admin,
}

impl Role {
    pub(crate) fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(DomainError::Unexpected(format!("unknown role '{raw}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Profile {
    pub(crate) id: String,
    pub(crate) email: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) role: Role,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// The author shape embedded in post and comment reads.
#[derive(Debug, Clone)]
pub(crate) struct AuthorRef {
    pub(crate) id: String,
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateProfileRequest {
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) bio: Option<String>,
}

impl UpdateProfileRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(display_name) = &self.display_name
            && display_name.chars().count() > MAX_DISPLAY_NAME_CHARS
        {
            return Err(DomainError::Validation {
                field: "displayName",
                message: "must be at most 50 chars",
            });
        }
        if let Some(bio) = &self.bio
            && bio.chars().count() > MAX_BIO_CHARS
        {
            return Err(DomainError::Validation {
                field: "bio",
                message: "must be at most 500 chars",
            });
        }
        Ok(self)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.avatar_url.is_none() && self.bio.is_none()
    }
}

/// Treats both a missing value and an all-whitespace value as absent. The
/// enrichment paths only fill fields that are blank in this sense.
pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}
