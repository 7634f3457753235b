use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthServices {
    database: &'static str,
    app: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    message: &'static str,
    timestamp: String,
    services: HealthServices,
    environment: String,
    version: String,
}

/// Always answers 200; a failing database shows up in the body.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match &state.db {
        Some(pool) => cms_infrastructure::check_health(pool).await,
        None => true,
    };

    let (status, message) = if database_ok {
        ("ok", "Server is running")
    } else {
        ("error", "Database connection failed")
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            message,
            timestamp: Utc::now().to_rfc3339(),
            services: HealthServices {
                database: if database_ok { "ok" } else { "error" },
                app: "ok",
            },
            environment: state.config.app.env.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
