use axum::{extract::State, Json};

use cms_core::services::ComposedModule;

use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Navigation for the caller - GET /api/menu
pub async fn user_menu(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Vec<ComposedModule>> {
    let menu = state.menu.compose(&principal).await?;
    Ok(Json(ApiResponse::success(menu)))
}
