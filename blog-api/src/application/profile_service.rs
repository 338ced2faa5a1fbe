use crate::data::profile_repository::{NewProfile, ProfilePatch, ProfileRepository};
use crate::domain::error::DomainError;
use crate::domain::profile::{Profile, UpdateProfileRequest, is_blank};

pub(crate) struct ProfileService<R: ProfileRepository> {
    repo: R,
}

impl<R: ProfileRepository> ProfileService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lazily creates the caller's profile on first sight. An existing
    /// profile is only enriched: blank display name / avatar fields are
    /// filled from the identity claims, non-blank ones are left alone.
    pub(crate) async fn get_or_create(
        &self,
        uid: &str,
        email: Option<&str>,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Profile, DomainError> {
        if let Some(existing) = self.repo.get(uid).await? {
            let mut patch = ProfilePatch::default();
            if is_blank(&existing.display_name)
                && let Some(display_name) = non_blank(display_name)
            {
                patch.display_name = Some(display_name);
            }
            if is_blank(&existing.avatar_url)
                && let Some(avatar_url) = non_blank(avatar_url)
            {
                patch.avatar_url = Some(avatar_url);
            }

            if patch.is_empty() {
                return Ok(existing);
            }
            return self
                .repo
                .update(uid, patch)
                .await?
                .ok_or_else(profile_not_found);
        }

        self.repo
            .insert(NewProfile {
                id: uid.to_string(),
                email: email.map(str::to_string),
                display_name: non_blank(display_name),
                avatar_url: non_blank(avatar_url),
            })
            .await
    }

    /// Explicit profile edit: supplied fields overwrite unconditionally.
    pub(crate) async fn update(
        &self,
        uid: &str,
        req: UpdateProfileRequest,
    ) -> Result<Profile, DomainError> {
        let req = req.validate()?;
        if req.is_empty() {
            return self.repo.get(uid).await?.ok_or_else(profile_not_found);
        }

        self.repo
            .update(
                uid,
                ProfilePatch {
                    display_name: req.display_name,
                    avatar_url: req.avatar_url,
                    bio: req.bio,
                },
            )
            .await?
            .ok_or_else(profile_not_found)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn profile_not_found() -> DomainError {
    DomainError::NotFound("Profile".to_string())
}
