//! Health check.

use axum::response::IntoResponse;
use axum::Json;

/// `GET /health`: liveness probe, no auth.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "larder-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
