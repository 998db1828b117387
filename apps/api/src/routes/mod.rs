pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::context::handlers as context_handlers;
use crate::extraction::handlers as extraction_handlers;
use crate::profile::handlers as profile_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document extraction
        .route(
            "/api/v1/documents/extract",
            post(extraction_handlers::handle_extract),
        )
        .route(
            "/api/v1/documents/extract/confirm",
            post(extraction_handlers::handle_extract_confirm),
        )
        // Aggregated context + derived insights
        .route("/api/v1/context", get(context_handlers::handle_get_context))
        .route(
            "/api/v1/opportunities",
            get(analysis_handlers::handle_get_opportunities),
        )
        .route(
            "/api/v1/analysis",
            get(analysis_handlers::handle_get_analysis),
        )
        // Profile + portfolio writes (each invalidates the analysis cache)
        .route("/api/v1/profile", patch(profile_handlers::handle_upsert_profile))
        .route(
            "/api/v1/portfolio/positions",
            post(profile_handlers::handle_add_position),
        )
        .with_state(state)
}
