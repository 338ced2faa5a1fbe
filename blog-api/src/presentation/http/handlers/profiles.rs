use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::profile::{Profile, Role, UpdateProfileRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::envelope::ApiResponse;
use crate::presentation::http::middleware::auth::CurrentUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProfileDto {
    #[validate(length(min = 1, max = 50))]
    pub(crate) display_name: Option<String>,
    #[validate(length(min = 1, max = 2048))]
    pub(crate) avatar_url: Option<String>,
    #[validate(length(max = 500))]
    pub(crate) bio: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileDto {
    pub(crate) id: String,
    pub(crate) email: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) role: RoleDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RoleDto {
    User,
    Admin,
}

impl From<Role> for RoleDto {
    fn from(role: Role) -> Self {
        match role {
            Role::User => RoleDto::User,
            Role::Admin => RoleDto::Admin,
        }
    }
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
            role: profile.role.into(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/me",
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller profile (created on first sight)", body = ProfileDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_my_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<(StatusCode, Json<ApiResponse<ProfileDto>>)> {
    let profile = state
        .profile_service
        .get_or_create(
            &user.uid,
            user.email.as_deref(),
            user.display_name.as_deref(),
            user.avatar_url.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(ProfileDto::from(profile))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/profiles/me",
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ProfileDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_my_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(dto): Json<UpdateProfileDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProfileDto>>)> {
    dto.validate()?;

    // the row may not exist yet for a first-time caller
    state
        .profile_service
        .get_or_create(
            &user.uid,
            user.email.as_deref(),
            user.display_name.as_deref(),
            user.avatar_url.as_deref(),
        )
        .await?;

    let req = UpdateProfileRequest {
        display_name: dto.display_name,
        avatar_url: dto.avatar_url,
        bio: dto.bio,
    };
    let profile = state.profile_service.update(&user.uid, req).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(ProfileDto::from(profile))),
    ))
}
