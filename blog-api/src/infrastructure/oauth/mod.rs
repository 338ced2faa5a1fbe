use thiserror::Error;

pub(crate) mod kakao;
pub(crate) mod naver;

#[derive(Debug, Error)]
pub(crate) enum OAuthError {
    #[error("failed to get {provider} token: {body}")]
    TokenExchange {
        provider: &'static str,
        body: String,
    },

    #[error("failed to get {provider} user info")]
    UserInfo { provider: &'static str },

    #[error("{provider} API error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} request failed")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}
