// ============================================================================
// CMS API - Router
// File: crates/cms-api/src/routes.rs
// ============================================================================
//! Admin routes pass three gates in order: bearer authentication, the menu
//! path guard, then the route group's permission requirement.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use cms_core::services::AccessRequirement;

use crate::handlers::{auth, health, menu, menu_items, modules, permissions, roles, users};
use crate::middleware::{authenticate, authorize_path, require_access};
use crate::state::AppState;

fn require_permission(router: Router<AppState>, expression: &str) -> Router<AppState> {
    let requirement = Arc::new(AccessRequirement::permissions(expression));
    router.route_layer(from_fn_with_state(requirement, require_access))
}

fn role_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/api/admin/roles", get(roles::index).post(roles::store))
        .route(
            "/api/admin/roles/{id}",
            get(roles::show).put(roles::update).delete(roles::destroy),
        )
        .route("/api/admin/permissions", get(permissions::index).post(permissions::store))
        .route("/api/admin/permissions/grouped", get(permissions::grouped))
        .route(
            "/api/admin/permissions/{id}",
            get(permissions::show)
                .put(permissions::update)
                .delete(permissions::destroy),
        );
    require_permission(router, "manage-roles")
}

fn module_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/api/admin/modules", get(modules::index).post(modules::store))
        .route(
            "/api/admin/modules/{id}",
            get(modules::show).put(modules::update).delete(modules::destroy),
        )
        .route("/api/admin/menu-items", get(menu_items::index).post(menu_items::store))
        .route(
            "/api/admin/menu-items/{id}",
            get(menu_items::show)
                .put(menu_items::update)
                .delete(menu_items::destroy),
        );
    require_permission(router, "manage-modules")
}

fn user_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/api/admin/users", get(users::index).post(users::store))
        .route("/api/admin/users/{id}", get(users::show))
        .route("/api/admin/users/{id}/roles", put(users::sync_roles));
    require_permission(router, "manage-users")
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .merge(role_routes())
        .merge(module_routes())
        .merge(user_routes())
        .route_layer(from_fn_with_state(state.clone(), authorize_path));

    let authenticated = Router::new()
        .route("/api/user", get(auth::user))
        .route("/api/menu", get(menu::user_menu))
        .route("/api/change-password", post(auth::change_password))
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::health_check))
        .route("/api/login", post(auth::login))
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.app.cors_origins))
        .with_state(state)
}
