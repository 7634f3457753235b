// ============================================================================
// CMS API - User Handlers
// File: crates/cms-api/src/handlers/users.rs
// ============================================================================

use axum::{extract::State, Json};

use cms_core::domain::UserWithRoles;

use crate::dto::{CreateUserRequest, SearchQuery, SyncRolesRequest};
use crate::extract::{IdPath, QueryParams, ValidatedJson};
use crate::response::{created, ApiResponse, ApiResult, Created};
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Vec<UserWithRoles>> {
    Ok(Json(ApiResponse::success(state.users.list(query.search).await?)))
}

pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Created<UserWithRoles> {
    let user = state
        .users
        .create(payload.name, payload.email, &payload.password, payload.role_ids)
        .await?;
    created(user, "User created successfully")
}

pub async fn show(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<UserWithRoles> {
    Ok(Json(ApiResponse::success(state.users.get(&id).await?)))
}

/// Replaces every role the user holds with `role_ids`.
pub async fn sync_roles(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<SyncRolesRequest>,
) -> ApiResult<UserWithRoles> {
    let user = state.users.sync_roles(&id, payload.role_ids).await?;
    Ok(Json(ApiResponse::success_with_message(user, "User roles updated successfully")))
}
