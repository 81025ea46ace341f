use crate::analysis::{evaluate_all, ModelInput, ModelOutcome};
use crate::errors::{AnalysisError, AnalysisResult};
use crate::profit::{CostBenefitMatrix, SweepStrategy};
use crate::state::{AppState, BatchSummary, DbCommand, ModelSummary};
use portable_atomic::Ordering;
use std::path::Path;
use std::sync::Arc;

/// One batch of models sharing a cost-benefit matrix and sweep strategy.
/// Same shape for HTTP bodies and the startup batch file.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EvaluationRequest {
    #[serde(default)]
    pub cost_benefit: Option<CostBenefitMatrix>,
    #[serde(default)]
    pub strategy: Option<SweepStrategy>,
    pub models: Vec<ModelInput>,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub batch_id: String,
    pub cost_benefit: CostBenefitMatrix,
    pub strategy: SweepStrategy,
    /// Run ids, index-aligned with `outcomes`; None for failed models.
    pub run_ids: Vec<Option<String>>,
    pub outcomes: Vec<ModelOutcome>,
}

impl BatchOutcome {
    pub fn to_json(&self) -> serde_json::Value {
        let models: Vec<serde_json::Value> = self
            .outcomes
            .iter()
            .zip(&self.run_ids)
            .map(|(outcome, run_id)| {
                let mut value = outcome.to_json();
                if let (Some(obj), Some(id)) = (value.as_object_mut(), run_id) {
                    obj.insert("run_id".into(), serde_json::json!(id));
                }
                value
            })
            .collect();
        serde_json::json!({
            "batch_id": self.batch_id,
            "cost_benefit": self.cost_benefit,
            "strategy": self.strategy,
            "models": models,
        })
    }
}

pub fn load_request(path: &Path) -> AnalysisResult<EvaluationRequest> {
    let raw = std::fs::read_to_string(path)?;
    let request: EvaluationRequest = serde_json::from_str(&raw)?;
    Ok(request)
}

/// Evaluate a batch, queue successful runs for persistence, update counters
/// and publish the batch summary.
pub async fn run_batch(state: &Arc<AppState>, request: EvaluationRequest) -> AnalysisResult<BatchOutcome> {
    if request.models.is_empty() {
        return Err(AnalysisError::EmptyInput("models"));
    }

    let cost_benefit = request.cost_benefit.unwrap_or(state.config.cost_benefit);
    let strategy = request.strategy.unwrap_or(state.config.sweep_strategy);
    let batch_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    tracing::info!(
        batch = %batch_id,
        models = request.models.len(),
        %strategy,
        cost_benefit = %cost_benefit,
        "evaluating batch"
    );

    let outcomes = evaluate_all(
        request.models,
        cost_benefit,
        strategy,
        state.config.observation_limit(strategy),
    )
    .await;

    let mut run_ids = Vec::with_capacity(outcomes.len());
    let mut summaries = Vec::with_capacity(outcomes.len());

    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                state.counters.evaluations_run.fetch_add(1, Ordering::Relaxed);
                state
                    .counters
                    .observations_scored
                    .fetch_add(report.observations as u64, Ordering::Relaxed);

                tracing::info!(
                    model = %report.model,
                    n = report.observations,
                    threshold = report.best_threshold,
                    profit = report.best_profit,
                    predicted_positive = report.predicted_positive,
                    "best threshold selected"
                );

                let run_id = uuid::Uuid::new_v4().to_string();
                let sent = state
                    .db_tx
                    .send(DbCommand::InsertRun {
                        id: run_id.clone(),
                        batch_id: batch_id.clone(),
                        created_at: now.clone(),
                        report: Box::new(report.clone()),
                    })
                    .await;
                if sent.is_err() {
                    tracing::warn!(model = %report.model, "db writer gone, run not persisted");
                }

                summaries.push(ModelSummary {
                    model: outcome.model.clone(),
                    run_id: Some(run_id.clone()),
                    best_threshold: Some(report.best_threshold),
                    best_profit: Some(report.best_profit),
                    error: None,
                });
                run_ids.push(Some(run_id));
            }
            Err(e) => {
                if e.is_input_error() {
                    state.counters.inputs_rejected.fetch_add(1, Ordering::Relaxed);
                }
                tracing::warn!(model = %outcome.model, error = %e, "model evaluation failed");
                summaries.push(ModelSummary {
                    model: outcome.model.clone(),
                    run_id: None,
                    best_threshold: None,
                    best_profit: None,
                    error: Some(e.to_string()),
                });
                run_ids.push(None);
            }
        }
    }

    state.publish(BatchSummary {
        batch_id: Some(batch_id.clone()),
        evaluated_at: Some(now),
        strategy: Some(strategy),
        cost_benefit: Some(cost_benefit),
        models: summaries,
    });

    Ok(BatchOutcome {
        batch_id,
        cost_benefit,
        strategy,
        run_ids,
        outcomes,
    })
}
