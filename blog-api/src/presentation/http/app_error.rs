use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;
use crate::presentation::http::envelope::ApiResponse;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unauthorized")]
    Unauthorized,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Domain(err) => {
                let status = match &err {
                    DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::Forbidden => StatusCode::FORBIDDEN,
                    // upstream messages pass through verbatim; our own
                    // failures stay redacted
                    DomainError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    DomainError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let error = match &err {
                    DomainError::Unexpected(_) => "internal error".to_string(),
                    _ => err.to_string(),
                };
                (status, ApiResponse::failure(error))
            }
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, ApiResponse::failure(err.to_string())),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::failure("Unauthorized"),
            ),
            AppError::AuthenticationFailed(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::failure_with_message("Authentication failed", message),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::failure("internal error"),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::AppError;
    use crate::domain::error::DomainError;

    #[test]
    fn domain_errors_map_to_their_status_codes() {
        let cases = [
            (DomainError::NotFound("Post".to_string()), StatusCode::NOT_FOUND),
            (DomainError::Forbidden, StatusCode::FORBIDDEN),
            (
                DomainError::Validation {
                    field: "title",
                    message: "must be 1..200 chars",
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::Upstream("db down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn authentication_failure_is_a_server_error() {
        let response = AppError::AuthenticationFailed("token exchange failed".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
