use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::profile::Profile;

#[derive(Debug, Clone)]
pub(crate) struct NewProfile {
    pub(crate) id: String,
    pub(crate) email: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ProfilePatch {
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) bio: Option<String>,
}

impl ProfilePatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.avatar_url.is_none() && self.bio.is_none()
    }
}

#[async_trait]
pub(crate) trait ProfileRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Profile>, DomainError>;

    async fn insert(&self, input: NewProfile) -> Result<Profile, DomainError>;

    /// Partial update; `None` when no row matches.
    async fn update(&self, id: &str, patch: ProfilePatch) -> Result<Option<Profile>, DomainError>;
}
