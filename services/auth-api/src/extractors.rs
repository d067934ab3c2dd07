//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use gatehouse_types::{ActingIdentity, Role, UserId};

use crate::state::AppState;

/// Authenticated user extracted from the bearer token.
///
/// The role comes from the store at extraction time, not from the
/// token, so privilege changes take effect on the next request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthUser {
    /// The identity passed into service operations
    pub fn identity(&self) -> ActingIdentity {
        ActingIdentity::new(self.user_id, self.role)
    }

    /// Reject non-admin callers at the boundary
    pub fn require_admin(&self) -> Result<(), crate::error::ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(gatehouse_core::AuthError::Forbidden("admin role required".to_string()).into())
        }
    }
}

/// Error response for auth failures
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    error: AuthErrorDetail,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetail {
    code: &'static str,
    message: &'static str,
}

/// Auth rejection type
#[derive(Debug)]
pub struct AuthRejection {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            error: AuthErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_bearer(parts)?;

        let identity = app_state.auth.authenticate(&token).await.map_err(|e| {
            tracing::debug!(error = ?e, "Bearer authentication failed");
            match e {
                gatehouse_core::AuthError::SessionExpired => AuthRejection {
                    status: StatusCode::UNAUTHORIZED,
                    code: "SESSION_EXPIRED",
                    message: "Session has expired",
                },
                _ => AuthRejection {
                    status: StatusCode::UNAUTHORIZED,
                    code: "INVALID_TOKEN",
                    message: "Invalid or expired token",
                },
            }
        })?;

        Ok(AuthUser {
            user_id: identity.user_id,
            role: identity.role,
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// The scheme must match exactly; anything else is rejected.
fn extract_bearer(parts: &Parts) -> Result<String, AuthRejection> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthRejection {
            status: StatusCode::UNAUTHORIZED,
            code: "MISSING_TOKEN",
            message: "No authentication token provided",
        })?;

    let auth_str = auth_header.to_str().map_err(|_| AuthRejection {
        status: StatusCode::UNAUTHORIZED,
        code: "INVALID_HEADER",
        message: "Invalid Authorization header encoding",
    })?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthRejection {
            status: StatusCode::UNAUTHORIZED,
            code: "INVALID_HEADER",
            message: "Authorization header must use the Bearer scheme",
        }),
    }
}
