//! # larder-api
//!
//! HTTP API server for larder. Exposes the four entry collections over a
//! generic REST surface, enforces the admin-email write gate on every
//! mutating route, and maps repository errors to JSON error bodies.

pub mod error;
pub mod handlers;
pub mod identity;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Build the application router.
///
/// One generic handler set serves every collection; the `:collection` path
/// segment is validated against the known collection names and anything else
/// is a 404.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/check-write-access",
            get(handlers::access::check_write_access),
        )
        .route(
            "/api/:collection",
            get(handlers::entries::list_entries).post(handlers::entries::create_entry),
        )
        .route(
            "/api/:collection/bulk",
            post(handlers::entries::bulk_create_entries),
        )
        .route(
            "/api/:collection/:id",
            get(handlers::entries::get_entry)
                .put(handlers::entries::update_entry)
                .delete(handlers::entries::delete_entry),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
