// ============================================================================
// CMS API - Permission Handlers
// File: crates/cms-api/src/handlers/permissions.rs
// ============================================================================

use std::collections::BTreeMap;

use axum::{extract::State, Json};

use cms_core::domain::{Permission, PermissionDetail};

use crate::dto::{PermissionRequest, SearchQuery};
use crate::extract::{IdPath, QueryParams, ValidatedJson};
use crate::response::{created, ApiResponse, ApiResult, Created};
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Vec<Permission>> {
    let permissions = state.permissions.list(query.search).await?;
    Ok(Json(ApiResponse::success(permissions)))
}

pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PermissionRequest>,
) -> Created<Permission> {
    let permission = state
        .permissions
        .create(payload.name, payload.guard_name.unwrap_or_default())
        .await?;
    created(permission, "Permission created successfully")
}

/// Permissions bucketed by the prefix before the first `-`.
pub async fn grouped(State(state): State<AppState>) -> ApiResult<BTreeMap<String, Vec<Permission>>> {
    Ok(Json(ApiResponse::success(state.permissions.grouped().await?)))
}

pub async fn show(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<PermissionDetail> {
    Ok(Json(ApiResponse::success(state.permissions.get(&id).await?)))
}

pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<PermissionRequest>,
) -> ApiResult<Permission> {
    let permission = state.permissions.update(&id, payload.name, payload.guard_name).await?;
    Ok(Json(ApiResponse::success_with_message(permission, "Permission updated successfully")))
}

pub async fn destroy(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<()> {
    state.permissions.delete(&id).await?;
    Ok(Json(ApiResponse::message("Permission deleted successfully")))
}
