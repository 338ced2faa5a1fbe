use chrono::{DateTime, Utc};

/// A user record in the identity registry. One row per stable subject id
/// (`uid`); third-party logins map onto these records.
#[derive(Debug, Clone)]
pub(crate) struct IdentityRecord {
    pub(crate) uid: String,
    pub(crate) email: Option<String>,
    pub(crate) email_verified: bool,
    pub(crate) display_name: Option<String>,
    pub(crate) photo_url: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Normalized profile returned by a provider's user-info endpoint.
#[derive(Debug, Clone)]
pub(crate) struct ProviderProfile {
    pub(crate) provider_id: String,
    pub(crate) email: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) photo_url: Option<String>,
}

/// Per-provider federation policy.
///
/// `link_by_verified_email` controls whether a login may attach to an
/// existing identity that carries the same email. `trust_provider_email`
/// controls whether the provider's email is stored (and marked verified) on
/// newly created identities; a provider that cannot guarantee verified
/// emails gets neither.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProviderRegistration {
    pub(crate) name: &'static str,
    pub(crate) uid_prefix: &'static str,
    pub(crate) link_by_verified_email: bool,
    pub(crate) trust_provider_email: bool,
}

impl ProviderRegistration {
    pub(crate) fn kakao(link_by_verified_email: bool) -> Self {
        Self {
            name: "kakao",
            uid_prefix: "kakao",
            link_by_verified_email,
            trust_provider_email: false,
        }
    }

    pub(crate) fn naver(link_by_verified_email: bool) -> Self {
        Self {
            name: "naver",
            uid_prefix: "naver",
            link_by_verified_email,
            trust_provider_email: true,
        }
    }

    pub(crate) fn scoped_uid(&self, provider_id: &str) -> String {
        format!("{}:{provider_id}", self.uid_prefix)
    }
}
