// ============================================================================
// CMS API - Authorization Middleware
// File: crates/cms-api/src/middleware/authorization.rs
// ============================================================================
//! Both layers run after [`super::authenticate`] and read the principal it
//! stored.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use cms_core::domain::Principal;
use cms_core::services::path_guard::UNAUTHENTICATED_MESSAGE;
use cms_core::services::AccessRequirement;

use crate::error::ApiError;
use crate::state::AppState;

/// Lets the request through only when the menu item governing its path
/// allows the caller.
pub async fn authorize_path(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request.extensions().get::<Principal>().cloned();
    let path = request.uri().path().to_string();

    state.path_guard.authorize(principal.as_ref(), &path).await?;
    Ok(next.run(request).await)
}

/// Route-group requirement, e.g. `permission:manage-roles`.
pub async fn require_access(
    State(requirement): State<Arc<AccessRequirement>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::Unauthorized(UNAUTHENTICATED_MESSAGE.to_string()))?;

    requirement.check(principal)?;
    Ok(next.run(request).await)
}
