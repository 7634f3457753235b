// ============================================================================
// CMS API - Module Handlers
// File: crates/cms-api/src/handlers/modules.rs
// ============================================================================

use axum::{extract::State, Json};

use cms_core::domain::{Module, ModuleWithMenuItems};

use crate::dto::{ModuleQuery, ModuleRequest};
use crate::extract::{IdPath, QueryParams, ValidatedJson};
use crate::response::{created, ApiResponse, ApiResult, Created};
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ModuleQuery>,
) -> ApiResult<Vec<ModuleWithMenuItems>> {
    let modules = state.modules.list(query.search, query.is_active).await?;
    Ok(Json(ApiResponse::success(modules)))
}

pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ModuleRequest>,
) -> Created<Module> {
    let module = state.modules.create(payload.into()).await?;
    created(module, "Module created successfully")
}

pub async fn show(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<ModuleWithMenuItems> {
    Ok(Json(ApiResponse::success(state.modules.get(&id).await?)))
}

pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<ModuleRequest>,
) -> ApiResult<Module> {
    let module = state.modules.update(&id, payload.into()).await?;
    Ok(Json(ApiResponse::success_with_message(module, "Module updated successfully")))
}

pub async fn destroy(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<()> {
    state.modules.delete(&id).await?;
    Ok(Json(ApiResponse::message("Module deleted successfully")))
}
