use serde::Deserialize;

use crate::domain::identity::ProviderProfile;
use crate::infrastructure::settings::NaverSettings;

use super::OAuthError;

const PROVIDER: &str = "naver";

/// Naver's success sentinel for the user-info result code.
const RESULT_OK: &str = "00";

/// Same two-step exchange as Kakao, with two Naver extras: the client's
/// CSRF `state` is round-tripped on the token call, and the user-info body
/// carries a result code that must match the success sentinel.
pub(crate) struct NaverClient {
    http: reqwest::Client,
    settings: NaverSettings,
}

#[derive(Debug, Deserialize)]
struct NaverTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct NaverUserResponse {
    resultcode: String,
    message: Option<String>,
    response: Option<NaverUser>,
}

#[derive(Debug, Deserialize)]
struct NaverUser {
    id: String,
    nickname: Option<String>,
    name: Option<String>,
    email: Option<String>,
    profile_image: Option<String>,
}

impl NaverClient {
    pub(crate) fn new(settings: NaverSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    pub(crate) async fn login_profile(
        &self,
        code: &str,
        state: &str,
    ) -> Result<ProviderProfile, OAuthError> {
        let token = self.exchange_code(code, state).await?;
        self.fetch_profile(&token.access_token).await
    }

    async fn exchange_code(
        &self,
        code: &str,
        state: &str,
    ) -> Result<NaverTokenResponse, OAuthError> {
        let params = [
            ("grant_type", "authorization_code".to_string()),
            ("client_id", self.settings.client_id.clone()),
            ("client_secret", self.settings.client_secret.clone()),
            ("code", code.to_string()),
            ("state", state.to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/oauth2.0/token", self.settings.auth_base_url))
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
            .json::<NaverTokenResponse>()
            .await
            .map_err(transport)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let response = self
            .http
            .get(format!("{}/v1/nid/me", self.settings.api_base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(OAuthError::UserInfo { provider: PROVIDER });
        }

        let body = response.json::<NaverUserResponse>().await.map_err(transport)?;
        if body.resultcode != RESULT_OK {
            return Err(OAuthError::Provider {
                provider: PROVIDER,
                message: body.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        let user = body.response.ok_or(OAuthError::Provider {
            provider: PROVIDER,
            message: "missing response payload".to_string(),
        })?;

        Ok(ProviderProfile {
            provider_id: user.id,
            email: user.email,
            display_name: user.nickname.or(user.name),
            photo_url: user.profile_image,
        })
    }
}

fn transport(source: reqwest::Error) -> OAuthError {
    OAuthError::Transport {
        provider: PROVIDER,
        source,
    }
}
