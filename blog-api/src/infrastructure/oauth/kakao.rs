use serde::Deserialize;

use crate::domain::identity::ProviderProfile;
use crate::infrastructure::settings::KakaoSettings;

use super::OAuthError;

const PROVIDER: &str = "kakao";

/// Two-step code exchange against Kakao: authorization code -> access
/// token, then access token -> user profile. Both steps are fatal on
/// failure; nothing is retried.
pub(crate) struct KakaoClient {
    http: reqwest::Client,
    settings: KakaoSettings,
}

#[derive(Debug, Deserialize)]
struct KakaoTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct KakaoUserResponse {
    id: i64,
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    profile: Option<KakaoAccountProfile>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccountProfile {
    nickname: Option<String>,
    profile_image_url: Option<String>,
}

impl KakaoClient {
    pub(crate) fn new(settings: KakaoSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    pub(crate) async fn login_profile(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        let token = self.exchange_code(code).await?;
        self.fetch_profile(&token.access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<KakaoTokenResponse, OAuthError> {
        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("client_id", self.settings.rest_api_key.clone()),
            ("redirect_uri", self.settings.redirect_uri.clone()),
            ("code", code.to_string()),
        ];
        if let Some(client_secret) = &self.settings.client_secret {
            params.push(("client_secret", client_secret.clone()));
        }

        let response = self
            .http
            .post(format!("{}/oauth/token", self.settings.auth_base_url))
            .form(&params)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange {
                provider: PROVIDER,
                body,
            });
        }

        response
            .json::<KakaoTokenResponse>()
            .await
            .map_err(transport)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let response = self
            .http
            .get(format!("{}/v2/user/me", self.settings.api_base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(OAuthError::UserInfo { provider: PROVIDER });
        }

        let user = response.json::<KakaoUserResponse>().await.map_err(transport)?;
        let account = user.kakao_account.unwrap_or(KakaoAccount {
            email: None,
            profile: None,
        });
        let profile = account.profile.unwrap_or(KakaoAccountProfile {
            nickname: None,
            profile_image_url: None,
        });

        Ok(ProviderProfile {
            provider_id: user.id.to_string(),
            email: account.email,
            display_name: profile.nickname,
            photo_url: profile.profile_image_url,
        })
    }
}

fn transport(source: reqwest::Error) -> OAuthError {
    OAuthError::Transport {
        provider: PROVIDER,
        source,
    }
}
