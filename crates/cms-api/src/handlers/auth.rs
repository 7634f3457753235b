// ============================================================================
// CMS API - Auth Handlers
// File: crates/cms-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (login, current user, password change)

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use cms_core::domain::UserWithRoles;
use cms_core::services::LoginResult;

use crate::dto::{ChangePasswordRequest, LoginRequest};
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// The caller with every role they hold and their effective permissions
/// under the active guard.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserWithRoles,
    pub guard_name: String,
    pub permissions: Vec<String>,
}

/// Login handler - POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResult> {
    let key = payload.email.trim().to_lowercase();
    if state.login_limiter.check_key(&key).is_err() {
        warn!("Login throttled for {}", key);
        return Err(ApiError::TooManyRequests);
    }

    let result = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(ApiResponse::success_with_message(result, "Login successful")))
}

/// Current user - GET /api/user
pub async fn user(State(state): State<AppState>, CurrentUser(principal): CurrentUser) -> ApiResult<UserProfile> {
    let user = state.users.get(&principal.user_id).await?;
    Ok(Json(ApiResponse::success(UserProfile {
        user,
        guard_name: principal.guard.to_string(),
        permissions: principal.permissions.into_iter().collect(),
    })))
}

/// Change password - POST /api/change-password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .users
        .change_password(&principal.user_id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(ApiResponse::message("Password changed successfully")))
}
