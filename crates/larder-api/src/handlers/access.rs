//! Write-access check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::identity::CallerIdentity;
use crate::state::AppState;

/// `GET /api/check-write-access`: tells a client whether the signed-in user
/// may mutate entries. Purely advisory for UI gating; every mutating route
/// re-checks the policy itself.
pub async fn check_write_access(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> impl IntoResponse {
    match caller.0 {
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "hasAccess": false })),
        ),
        Some(identity) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "hasAccess": state.policy.has_write_access(&identity)
            })),
        ),
    }
}
