//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::user::UserDetails};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response. When `password_change_required` is set the token is
/// absent and the caller must complete `/auth/change-password` first.
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub token_type: String,
    pub password_change_required: bool,
    pub user: UserDetails,
}

/// Password change request; re-authenticates with the current password
#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub username: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Authenticate and obtain a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login result", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    let password_change_required = token.is_none();
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        password_change_required,
        user,
    }))
}

/// Choose a new password (completes a forced password change) and log in
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed, session opened", body = LoginResponse),
        (status = 400, description = "Password too short or confirmation mismatch"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .change_password(
            &request.username,
            &request.current_password,
            &request.new_password,
            &request.confirm_password,
        )
        .await?;

    Ok(Json(LoginResponse {
        token: Some(token),
        token_type: "Bearer".to_string(),
        password_change_required: false,
        user,
    }))
}

/// Current session's account
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserDetails),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserDetails>> {
    let user = state.services.users.me(&claims).await?;
    Ok(Json(user))
}
