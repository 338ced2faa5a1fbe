use std::sync::Arc;

use crate::data::identity_repository::{IdentityPatch, IdentityRepository, NewIdentity};
use crate::domain::error::DomainError;
use crate::domain::identity::{IdentityRecord, ProviderProfile, ProviderRegistration};
use crate::domain::profile::is_blank;
use crate::infrastructure::jwt::{SessionClaims, SessionTokens};

#[derive(Debug, Clone)]
pub(crate) struct FederatedUser {
    pub(crate) uid: String,
    pub(crate) display_name: Option<String>,
    pub(crate) photo_url: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) is_linked_account: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct FederatedLogin {
    pub(crate) custom_token: String,
    pub(crate) user: FederatedUser,
}

/// Maps a verified third-party profile onto a stable local identity and
/// issues a session credential for it.
pub(crate) struct FederationService<I: IdentityRepository> {
    identities: I,
    tokens: Arc<SessionTokens>,
}

impl<I: IdentityRepository> FederationService<I> {
    pub(crate) fn new(identities: I, tokens: Arc<SessionTokens>) -> Self {
        Self { identities, tokens }
    }

    pub(crate) async fn federate(
        &self,
        registration: &ProviderRegistration,
        profile: ProviderProfile,
    ) -> Result<FederatedLogin, DomainError> {
        let linked = if registration.link_by_verified_email {
            match profile.email.as_deref() {
                Some(email) => self.identities.get_by_email(email).await?,
                None => None,
            }
        } else {
            None
        };
        let is_linked_account = linked.is_some();

        let identity = match linked {
            Some(existing) => self.backfill_linked(existing, &profile).await?,
            None => self.upsert_provider_scoped(registration, &profile).await?,
        };

        let custom_token = self
            .tokens
            .issue(SessionClaims {
                sub: identity.uid.clone(),
                email: identity.email.clone(),
                name: identity.display_name.clone(),
                picture: identity.photo_url.clone(),
                provider: Some(registration.name.to_string()),
                provider_id: Some(profile.provider_id.clone()),
                linked_account: is_linked_account,
            })
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(FederatedLogin {
            custom_token,
            user: FederatedUser {
                uid: identity.uid,
                display_name: profile.display_name,
                photo_url: profile.photo_url,
                email: profile.email,
                is_linked_account,
            },
        })
    }

    /// A linked identity only gets fields it is missing; an existing
    /// display name or photo is never overwritten by a provider login.
    async fn backfill_linked(
        &self,
        existing: IdentityRecord,
        profile: &ProviderProfile,
    ) -> Result<IdentityRecord, DomainError> {
        let mut patch = IdentityPatch::default();
        if is_blank(&existing.display_name) && profile.display_name.is_some() {
            patch.display_name = profile.display_name.clone();
        }
        if is_blank(&existing.photo_url) && profile.photo_url.is_some() {
            patch.photo_url = profile.photo_url.clone();
        }

        if patch.is_empty() {
            Ok(existing)
        } else {
            self.identities.update(&existing.uid, patch).await
        }
    }

    /// The provider-scoped identity tracks the provider: repeated logins
    /// overwrite display name and photo with the latest provider values.
    async fn upsert_provider_scoped(
        &self,
        registration: &ProviderRegistration,
        profile: &ProviderProfile,
    ) -> Result<IdentityRecord, DomainError> {
        let uid = registration.scoped_uid(&profile.provider_id);

        match self.identities.get_by_uid(&uid).await? {
            Some(_) => {
                self.identities
                    .update(
                        &uid,
                        IdentityPatch {
                            display_name: profile.display_name.clone(),
                            photo_url: profile.photo_url.clone(),
                        },
                    )
                    .await
            }
            None => {
                let email = if registration.trust_provider_email {
                    profile.email.clone()
                } else {
                    None
                };
                let email_verified = email.is_some();
                self.identities
                    .create(NewIdentity {
                        uid,
                        email,
                        email_verified,
                        display_name: profile.display_name.clone(),
                        photo_url: profile.photo_url.clone(),
                    })
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::FederationService;
    use crate::data::identity_repository::{IdentityPatch, IdentityRepository, NewIdentity};
    use crate::domain::error::DomainError;
    use crate::domain::identity::{IdentityRecord, ProviderProfile, ProviderRegistration};
    use crate::infrastructure::jwt::SessionTokens;

    #[derive(Clone, Default)]
    struct FakeIdentityRepo {
        records: Arc<Mutex<HashMap<String, IdentityRecord>>>,
    }

    impl FakeIdentityRepo {
        fn seed(&self, record: IdentityRecord) {
            self.records
                .lock()
                .expect("records mutex poisoned")
                .insert(record.uid.clone(), record);
        }

        fn stored(&self, uid: &str) -> IdentityRecord {
            self.records
                .lock()
                .expect("records mutex poisoned")
                .get(uid)
                .cloned()
                .expect("identity must exist")
        }
    }

    #[async_trait]
    impl IdentityRepository for FakeIdentityRepo {
        async fn get_by_uid(&self, uid: &str) -> Result<Option<IdentityRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .expect("records mutex poisoned")
                .get(uid)
                .cloned())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .expect("records mutex poisoned")
                .values()
                .find(|record| record.email.as_deref() == Some(email))
                .cloned())
        }

        async fn create(&self, input: NewIdentity) -> Result<IdentityRecord, DomainError> {
            let record = IdentityRecord {
                uid: input.uid.clone(),
                email: input.email,
                email_verified: input.email_verified,
                display_name: input.display_name,
                photo_url: input.photo_url,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.seed(record.clone());
            Ok(record)
        }

        async fn update(
            &self,
            uid: &str,
            patch: IdentityPatch,
        ) -> Result<IdentityRecord, DomainError> {
            let mut records = self.records.lock().expect("records mutex poisoned");
            let record = records
                .get_mut(uid)
                .ok_or_else(|| DomainError::NotFound("Identity".to_string()))?;
            if let Some(display_name) = patch.display_name {
                record.display_name = Some(display_name);
            }
            if let Some(photo_url) = patch.photo_url {
                record.photo_url = Some(photo_url);
            }
            record.updated_at = Utc::now();
            Ok(record.clone())
        }
    }

    fn service() -> (FakeIdentityRepo, FederationService<FakeIdentityRepo>) {
        let repo = FakeIdentityRepo::default();
        let tokens = Arc::new(SessionTokens::new("0123456789abcdef0123456789abcdef", 3600));
        (repo.clone(), FederationService::new(repo, tokens))
    }

    fn kakao_profile(id: &str, nickname: &str) -> ProviderProfile {
        ProviderProfile {
            provider_id: id.to_string(),
            email: None,
            display_name: Some(nickname.to_string()),
            photo_url: None,
        }
    }

    fn naver_profile(id: &str, email: Option<&str>, nickname: &str) -> ProviderProfile {
        ProviderProfile {
            provider_id: id.to_string(),
            email: email.map(str::to_string),
            display_name: Some(nickname.to_string()),
            photo_url: None,
        }
    }

    fn existing_identity(uid: &str, email: Option<&str>) -> IdentityRecord {
        IdentityRecord {
            uid: uid.to_string(),
            email: email.map(str::to_string),
            email_verified: email.is_some(),
            display_name: None,
            photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn kakao_uid_is_stable_and_display_name_always_overwritten() {
        let (repo, service) = service();
        let registration = ProviderRegistration::kakao(false);

        let first = service
            .federate(&registration, kakao_profile("555", "A"))
            .await
            .expect("first login must succeed");
        assert_eq!(first.user.uid, "kakao:555");
        assert!(!first.user.is_linked_account);

        let second = service
            .federate(&registration, kakao_profile("555", "B"))
            .await
            .expect("second login must succeed");
        assert_eq!(second.user.uid, "kakao:555");

        assert_eq!(repo.stored("kakao:555").display_name.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn kakao_never_links_by_email() {
        let (repo, service) = service();
        repo.seed(existing_identity("legacy-uid", Some("x@example.com")));

        let mut profile = kakao_profile("555", "A");
        profile.email = Some("x@example.com".to_string());

        let login = service
            .federate(&ProviderRegistration::kakao(false), profile)
            .await
            .expect("login must succeed");

        assert_eq!(login.user.uid, "kakao:555");
        assert!(!login.user.is_linked_account);
        // kakao identities never store the provider email
        assert_eq!(repo.stored("kakao:555").email, None);
        assert!(!repo.stored("kakao:555").email_verified);
    }

    #[tokio::test]
    async fn naver_links_existing_identity_and_backfills_only_empty_fields() {
        let (repo, service) = service();
        repo.seed(existing_identity("legacy-uid", Some("x@example.com")));
        let registration = ProviderRegistration::naver(true);

        let login = service
            .federate(
                &registration,
                naver_profile("777", Some("x@example.com"), "Nori"),
            )
            .await
            .expect("login must succeed");

        assert!(login.user.is_linked_account);
        assert_eq!(login.user.uid, "legacy-uid");
        assert_eq!(
            repo.stored("legacy-uid").display_name.as_deref(),
            Some("Nori")
        );

        // second login must not overwrite the now-filled display name
        let login = service
            .federate(
                &registration,
                naver_profile("777", Some("x@example.com"), "Nori2"),
            )
            .await
            .expect("second login must succeed");
        assert!(login.user.is_linked_account);
        assert_eq!(
            repo.stored("legacy-uid").display_name.as_deref(),
            Some("Nori")
        );
    }

    #[tokio::test]
    async fn naver_without_email_gets_a_provider_scoped_identity() {
        let (repo, service) = service();

        let login = service
            .federate(
                &ProviderRegistration::naver(true),
                naver_profile("777", None, "Nori"),
            )
            .await
            .expect("login must succeed");

        assert_eq!(login.user.uid, "naver:777");
        assert!(!login.user.is_linked_account);
        assert_eq!(repo.stored("naver:777").email, None);
    }

    #[tokio::test]
    async fn naver_trusts_provider_email_on_create() {
        let (repo, service) = service();

        service
            .federate(
                &ProviderRegistration::naver(true),
                naver_profile("777", Some("nori@example.com"), "Nori"),
            )
            .await
            .expect("login must succeed");

        let stored = repo.stored("naver:777");
        assert_eq!(stored.email.as_deref(), Some("nori@example.com"));
        assert!(stored.email_verified);
    }

    #[tokio::test]
    async fn linking_policy_flag_disables_naver_linking() {
        let (repo, service) = service();
        repo.seed(existing_identity("legacy-uid", Some("x@example.com")));

        let login = service
            .federate(
                &ProviderRegistration::naver(false),
                naver_profile("777", Some("x@example.com"), "Nori"),
            )
            .await
            .expect("login must succeed");

        assert_eq!(login.user.uid, "naver:777");
        assert!(!login.user.is_linked_account);
    }

    #[tokio::test]
    async fn custom_token_carries_the_provider_claims() {
        let (_, service) = service();
        let tokens = SessionTokens::new("0123456789abcdef0123456789abcdef", 3600);

        let login = service
            .federate(
                &ProviderRegistration::kakao(false),
                kakao_profile("555", "Nori"),
            )
            .await
            .expect("login must succeed");

        let claims = tokens
            .verify(&login.custom_token)
            .expect("token must verify");
        assert_eq!(claims.sub, "kakao:555");
        assert_eq!(claims.provider.as_deref(), Some("kakao"));
        assert_eq!(claims.provider_id.as_deref(), Some("555"));
        assert!(!claims.linked_account);
        assert_eq!(claims.name.as_deref(), Some("Nori"));
    }
}
