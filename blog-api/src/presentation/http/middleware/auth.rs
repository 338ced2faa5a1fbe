use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::infrastructure::jwt::Claims;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

/// The verified caller identity, decoded from the bearer credential.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser {
    pub(crate) uid: String,
    pub(crate) email: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
            display_name: claims.name,
            avatar_url: claims.picture,
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller identity when present; anonymous requests extract `None`.
#[derive(Debug, Clone)]
pub(crate) struct MaybeUser(pub(crate) Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Required mode: missing or invalid credential rejects the request before
/// any handler logic runs.
pub(crate) async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentUser::from(claims));
    Ok(next.run(request).await)
}

/// Optional mode: a missing or invalid credential is never an error, the
/// request just proceeds anonymously. Exists so draft visibility and view
/// counting can see a caller identity without forcing login.
pub(crate) async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = bearer_token(&request).and_then(|token| state.tokens.verify(token).ok());
    if let Some(claims) = claims {
        request.extensions_mut().insert(CurrentUser::from(claims));
    }
    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<&str> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};

    use super::bearer_token;

    fn request_with_auth(value: &str) -> Request<Body> {
        Request::builder()
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .expect("request must build")
    }

    #[test]
    fn bearer_token_parses_well_formed_header() {
        let request = request_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&request), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_is_scheme_insensitive() {
        let request = request_with_auth("bearer abc");
        assert_eq!(bearer_token(&request), Some("abc"));
    }

    #[test]
    fn bearer_token_rejects_malformed_headers() {
        assert_eq!(bearer_token(&request_with_auth("Basic abc")), None);
        assert_eq!(bearer_token(&request_with_auth("Bearer")), None);
        assert_eq!(bearer_token(&request_with_auth("Bearer a b")), None);
        assert_eq!(
            bearer_token(&Request::builder().body(Body::empty()).expect("must build")),
            None
        );
    }
}
