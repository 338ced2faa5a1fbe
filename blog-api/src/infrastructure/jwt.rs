use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum TokenError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Session credential claims. `sub` is the stable subject id; the profile
/// fields let authenticated requests see the caller identity without an
/// extra registry read. The provider triple is stamped by federation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) provider_id: Option<String>,
    #[serde(default)]
    pub(crate) linked_account: bool,
}

/// Input for issuing a session credential; `exp` is stamped here.
#[derive(Debug, Clone)]
pub(crate) struct SessionClaims {
    pub(crate) sub: String,
    pub(crate) email: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) picture: Option<String>,
    pub(crate) provider: Option<String>,
    pub(crate) provider_id: Option<String>,
    pub(crate) linked_account: bool,
}

pub(crate) struct SessionTokens {
    secret: String,
    ttl_seconds: i64,
}

impl SessionTokens {
    const DEFAULT_TTL_SECONDS: i64 = 60 * 60;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        SessionTokens {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub(crate) fn issue(&self, session: SessionClaims) -> Result<String, TokenError> {
        let exp = (Utc::now() + Duration::seconds(self.ttl_seconds)).timestamp();

        let claims = Claims {
            sub: session.sub,
            exp,
            email: session.email,
            name: session.name,
            picture: session.picture,
            provider: session.provider,
            provider_id: session.provider_id,
            linked_account: session.linked_account,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(TokenError::Encode)
    }

    pub(crate) fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(TokenError::Decode)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionClaims, SessionTokens};

    fn tokens() -> SessionTokens {
        SessionTokens::new("0123456789abcdef0123456789abcdef", 3600)
    }

    fn sample_session() -> SessionClaims {
        SessionClaims {
            sub: "kakao:555".to_string(),
            email: None,
            name: Some("Nori".to_string()),
            picture: None,
            provider: Some("kakao".to_string()),
            provider_id: Some("555".to_string()),
            linked_account: false,
        }
    }

    #[test]
    fn issue_and_verify_round_trips_claims() {
        let tokens = tokens();
        let token = tokens.issue(sample_session()).expect("issue must succeed");

        let claims = tokens.verify(&token).expect("verify must succeed");
        assert_eq!(claims.sub, "kakao:555");
        assert_eq!(claims.name.as_deref(), Some("Nori"));
        assert_eq!(claims.provider.as_deref(), Some("kakao"));
        assert_eq!(claims.provider_id.as_deref(), Some("555"));
        assert!(!claims.linked_account);
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let token = tokens().issue(sample_session()).expect("issue must succeed");

        let other = SessionTokens::new("ffffffffffffffffffffffffffffffff", 3600);
        other.verify(&token).expect_err("must reject");
    }

    #[test]
    fn verify_rejects_garbage() {
        tokens().verify("not-a-token").expect_err("must reject");
    }
}
