use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub struct HealthHandler;

impl HealthHandler {
    /// Unauthenticated, unrate-limited liveness probe. Runs a trivial
    /// query so a broken database connection shows up as a failing health
    /// check rather than as a wall of 500s on the first real request.
    pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
        match sqlx::query("SELECT 1").execute(state.gateway.pool()).await {
            Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "up" }))),
            Err(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "down", "error": e.to_string() })),
            ),
        }
    }
}
