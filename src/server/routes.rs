use crate::batch::{self, EvaluationRequest};
use crate::db;
use crate::state::{AppState, BatchSummary};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct RunsQuery {
    pub model: Option<String>,
    pub limit: Option<usize>,
}

/// POST /api/evaluate -- profit curves + best thresholds for one batch of models
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluationRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    match batch::run_batch(&state, request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.to_json())),
        Err(e) => {
            let status = if e.is_input_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(serde_json::json!({ "error": e.to_string() })))
        }
    }
}

/// GET /api/latest -- most recent batch summary (from watch channel, no lock)
pub async fn get_latest(State(state): State<Arc<AppState>>) -> Json<BatchSummary> {
    let summary = state.latest_rx.borrow().clone();
    Json(summary)
}

/// GET /api/runs -- persisted run summaries from DB (cold path)
pub async fn get_runs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunsQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    let limit = params.limit.unwrap_or(50).min(200);
    match db::get_recent_runs(&state.db, params.model.as_deref(), limit) {
        Ok(runs) => (StatusCode::OK, Json(serde_json::json!({ "runs": runs }))),
        Err(e) => internal(e),
    }
}

/// GET /api/runs/{id} -- one persisted run
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    match db::get_run(&state.db, &run_id) {
        Ok(Some(run)) => (StatusCode::OK, Json(serde_json::json!(run))),
        Ok(None) => not_found(&run_id),
        Err(e) => internal(e),
    }
}

/// GET /api/runs/{id}/curve -- stored thresholds, profits and plot axis
pub async fn get_run_curve(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    match db::get_run_curve(&state.db, &run_id) {
        Ok(Some(curve)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "run_id": run_id, "curve": curve })),
        ),
        Ok(None) => not_found(&run_id),
        Err(e) => internal(e),
    }
}

/// GET /api/config -- defaults applied when a request omits them
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "cost_benefit": state.config.cost_benefit,
        "strategy": state.config.sweep_strategy,
        "max_observations": state.config.max_observations,
        "max_exact_observations": state.config.max_exact_observations,
    }))
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "evaluations_run": state.counters.evaluations_run.load(Relaxed),
        "observations_scored": state.counters.observations_scored.load(Relaxed),
        "inputs_rejected": state.counters.inputs_rejected.load(Relaxed),
        "runs_persisted": state.counters.runs_persisted.load(Relaxed),
    }))
}

fn not_found(run_id: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("run not found: {run_id}") })),
    )
}

fn internal(e: crate::errors::AnalysisError) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
}
