// ============================================================================
// CMS API - Menu Item Handlers
// File: crates/cms-api/src/handlers/menu_items.rs
// ============================================================================

use axum::{extract::State, Json};

use cms_core::domain::{MenuItemDetail, MenuItemFilter};

use crate::dto::MenuItemRequest;
use crate::extract::{IdPath, QueryParams, ValidatedJson};
use crate::response::{created, ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// Filters: `module_id`, `parent_id` or `top_level`, `search`, `is_active`.
pub async fn index(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<MenuItemFilter>,
) -> ApiResult<Vec<MenuItemDetail>> {
    Ok(Json(ApiResponse::success(state.menu_items.list(&filter).await?)))
}

pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<MenuItemRequest>,
) -> Created<MenuItemDetail> {
    let item = state.menu_items.create(payload.into()).await?;
    created(item, "Menu item created successfully")
}

pub async fn show(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<MenuItemDetail> {
    Ok(Json(ApiResponse::success(state.menu_items.get(&id).await?)))
}

pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<MenuItemRequest>,
) -> ApiResult<MenuItemDetail> {
    let item = state.menu_items.update(&id, payload.into()).await?;
    Ok(Json(ApiResponse::success_with_message(item, "Menu item updated successfully")))
}

/// Removes the item together with its whole subtree.
pub async fn destroy(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<()> {
    state.menu_items.delete(&id).await?;
    Ok(Json(ApiResponse::message("Menu item deleted successfully")))
}
