//! Authentication handlers (register, login, profile, verification, reset)

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use gatehouse_core::RegisterInput;
use gatehouse_types::{PublicUser, UserId};

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
///
/// Create an unverified account and dispatch a verification email
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .auth
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
///
/// Exchange email and password for a session bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let token = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
    }))
}

/// GET /auth/profile?userId=
///
/// Own profile by default; another user's profile requires admin
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Json<PublicUser>> {
    let profile = state
        .auth
        .get_profile(&user.identity(), query.user_id)
        .await?;
    Ok(Json(profile))
}

/// GET /auth/verify-email?token=
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<VerifyEmailResponse>> {
    let user = state.auth.verify_email(&query.token).await?;

    Ok(Json(VerifyEmailResponse {
        message: "Email verified",
        user,
    }))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth.forgot_password(&req.email).await?;

    Ok(Json(MessageResponse {
        message: "Password reset email sent",
    }))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth
        .reset_password(&req.token, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated",
    }))
}
