use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::federation_service::FederatedLogin;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::envelope::ApiResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct KakaoLoginDto {
    #[validate(length(min = 1))]
    pub(crate) code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct NaverLoginDto {
    #[validate(length(min = 1))]
    pub(crate) code: String,
    /// CSRF state round-tripped from the client; the pre-callback
    /// comparison happens client-side, the server treats it as opaque.
    #[validate(length(min = 1))]
    pub(crate) state: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FederatedLoginDto {
    pub(crate) custom_token: String,
    pub(crate) user: FederatedUserDto,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FederatedUserDto {
    pub(crate) uid: String,
    pub(crate) display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub(crate) photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    pub(crate) is_linked_account: bool,
}

impl From<FederatedLogin> for FederatedLoginDto {
    fn from(login: FederatedLogin) -> Self {
        Self {
            custom_token: login.custom_token,
            user: FederatedUserDto {
                uid: login.user.uid,
                display_name: login.user.display_name,
                photo_url: login.user.photo_url,
                email: login.user.email,
                is_linked_account: login.user.is_linked_account,
            },
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/kakao",
    tag = "auth",
    request_body = KakaoLoginDto,
    responses(
        (status = 200, description = "Login succeeded", body = FederatedLoginDto),
        (status = 400, description = "Missing authorization code"),
        (status = 500, description = "Authentication failed")
    )
)]
pub(crate) async fn kakao_login(
    State(state): State<AppState>,
    Json(dto): Json<KakaoLoginDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<FederatedLoginDto>>)> {
    dto.validate()?;

    let profile = state
        .kakao
        .login_profile(&dto.code)
        .await
        .map_err(|err| AppError::AuthenticationFailed(err.to_string()))?;
    let login = state
        .federation_service
        .federate(&state.kakao_registration, profile)
        .await
        .map_err(|err| AppError::AuthenticationFailed(err.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(FederatedLoginDto::from(login))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/naver",
    tag = "auth",
    request_body = NaverLoginDto,
    responses(
        (status = 200, description = "Login succeeded", body = FederatedLoginDto),
        (status = 400, description = "Missing authorization code or state"),
        (status = 500, description = "Authentication failed")
    )
)]
pub(crate) async fn naver_login(
    State(state): State<AppState>,
    Json(dto): Json<NaverLoginDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<FederatedLoginDto>>)> {
    dto.validate()?;

    let profile = state
        .naver
        .login_profile(&dto.code, &dto.state)
        .await
        .map_err(|err| AppError::AuthenticationFailed(err.to_string()))?;
    let login = state
        .federation_service
        .federate(&state.naver_registration, profile)
        .await
        .map_err(|err| AppError::AuthenticationFailed(err.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(FederatedLoginDto::from(login))),
    ))
}
