//! Admin user management handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::EditUserInput;
use gatehouse_types::{PublicUser, UserId};

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EditUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: &'static str,
}

/// GET /auth/users
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    user.require_admin()?;
    let users = state.auth.list_users(&user.identity()).await?;
    Ok(Json(users))
}

/// PUT /auth/users/{id}
pub async fn edit_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EditUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    user.require_admin()?;
    let updated = state
        .auth
        .edit_user(
            &user.identity(),
            UserId(id),
            EditUserInput {
                username: req.username,
                email: req.email,
                role: req.role,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// DELETE /auth/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteUserResponse>> {
    user.require_admin()?;
    state.auth.delete_user(&user.identity(), UserId(id)).await?;
    Ok(Json(DeleteUserResponse {
        message: "User deleted",
    }))
}
