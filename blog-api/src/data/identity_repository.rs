use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::identity::IdentityRecord;

#[derive(Debug, Clone)]
pub(crate) struct NewIdentity {
    pub(crate) uid: String,
    pub(crate) email: Option<String>,
    pub(crate) email_verified: bool,
    pub(crate) display_name: Option<String>,
    pub(crate) photo_url: Option<String>,
}

/// Profile metadata updates. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdentityPatch {
    pub(crate) display_name: Option<String>,
    pub(crate) photo_url: Option<String>,
}

impl IdentityPatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

#[async_trait]
pub(crate) trait IdentityRepository: Send + Sync {
    async fn get_by_uid(&self, uid: &str) -> Result<Option<IdentityRecord>, DomainError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DomainError>;

    async fn create(&self, input: NewIdentity) -> Result<IdentityRecord, DomainError>;

    async fn update(&self, uid: &str, patch: IdentityPatch)
    -> Result<IdentityRecord, DomainError>;
}
