pub mod protected;
pub mod public;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Contact Desk API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Case management backend for health department contact tracing",
        "endpoints": {
            "login": "/login, /api/login (public)",
            "actions": "/api/hd/actions[/:case[/resolve]] (department staff)",
            "cases": "/api/hd/cases/:case (department staff)",
            "password": "/api/user/me/password (authenticated)",
            "health": "/health (public)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.repos.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
