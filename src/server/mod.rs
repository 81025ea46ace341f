pub mod routes;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    // Size rejections belong to TooLarge, not the transport.
    let body_limit = state.config.body_limit_bytes();
    Router::new()
        .route("/api/evaluate", post(routes::evaluate))
        .route("/api/latest", get(routes::get_latest))
        .route("/api/runs", get(routes::get_runs))
        .route("/api/runs/{id}", get(routes::get_run))
        .route("/api/runs/{id}/curve", get(routes::get_run_curve))
        .route("/api/config", get(routes::get_config))
        .route("/api/counters", get(routes::get_counters))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
