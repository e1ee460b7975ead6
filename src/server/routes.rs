//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Counseling results
        .route("/api/results", get(handlers::round_results))
        .route("/api/results/listing", get(handlers::round_listing))
        // College directory
        .route("/api/colleges", get(handlers::list_colleges))
        .route("/api/colleges/:college_id", get(handlers::college_detail))
        .route(
            "/api/colleges/:college_id/results",
            get(handlers::college_results),
        )
        .route(
            "/api/colleges/:college_id/bonk",
            post(handlers::bonk_college),
        )
        .route(
            "/api/colleges/:college_id/reviews",
            post(handlers::add_review),
        )
        .route(
            "/api/colleges/:college_id/images",
            post(handlers::add_image),
        )
        // Per-counseling-type lookup tables
        .route("/api/profiles/:type_name", get(handlers::counseling_profile))
        .route("/api/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
