// ============================================================================
// CMS API - Role Handlers
// File: crates/cms-api/src/handlers/roles.rs
// ============================================================================

use axum::{extract::State, Json};

use cms_core::domain::RoleWithPermissions;

use crate::dto::{RoleRequest, SearchQuery};
use crate::extract::{IdPath, QueryParams, ValidatedJson};
use crate::response::{created, ApiResponse, ApiResult, Created};
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Vec<RoleWithPermissions>> {
    Ok(Json(ApiResponse::success(state.roles.list(query.search).await?)))
}

pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RoleRequest>,
) -> Created<RoleWithPermissions> {
    let role = state
        .roles
        .create(
            payload.name,
            payload.guard_name.unwrap_or_default(),
            payload.permission_ids.unwrap_or_default(),
        )
        .await?;
    created(role, "Role created successfully")
}

pub async fn show(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<RoleWithPermissions> {
    Ok(Json(ApiResponse::success(state.roles.get(&id).await?)))
}

/// `permission_ids`, when present, replaces the whole permission set.
pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<RoleRequest>,
) -> ApiResult<RoleWithPermissions> {
    let role = state.roles.update(&id, payload.name, payload.permission_ids).await?;
    Ok(Json(ApiResponse::success_with_message(role, "Role updated successfully")))
}

pub async fn destroy(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<()> {
    state.roles.delete(&id).await?;
    Ok(Json(ApiResponse::message("Role deleted successfully")))
}
