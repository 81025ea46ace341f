use super::evaluator::{evaluate_model, EvaluationReport};
use crate::errors::{AnalysisError, AnalysisResult};
use crate::models::logistic::LogisticScorer;
use crate::models::scores::PrecomputedScores;
use crate::profit::{CostBenefitMatrix, SweepStrategy};

/// One model to evaluate, as supplied by a request or batch file.
/// Labels are read as plain integers and checked per model, so a bad label
/// surfaces as `InvalidLabel` instead of failing the whole body.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum ModelInput {
    /// Probabilities already produced by an external model.
    Scored {
        name: String,
        labels: Vec<i64>,
        probabilities: Vec<f64>,
    },
    /// A fitted logistic regression plus the feature rows to score.
    Logistic {
        name: String,
        labels: Vec<i64>,
        features: Vec<Vec<f64>>,
        intercept: f64,
        coefficients: Vec<f64>,
    },
}

impl ModelInput {
    pub fn name(&self) -> &str {
        match self {
            Self::Scored { name, .. } | Self::Logistic { name, .. } => name,
        }
    }

    /// Size used against the observation limit: the longest of the
    /// parallel inputs, so oversized feature matrices are caught too.
    pub fn observations(&self) -> usize {
        match self {
            Self::Scored { labels, probabilities, .. } => labels.len().max(probabilities.len()),
            Self::Logistic { labels, features, .. } => labels.len().max(features.len()),
        }
    }

    fn run(self, cb: &CostBenefitMatrix, strategy: SweepStrategy) -> AnalysisResult<EvaluationReport> {
        match self {
            Self::Scored { name, labels, probabilities } => {
                let labels = binary_labels(&labels)?;
                let model = PrecomputedScores::new(name, probabilities);
                evaluate_model(&model, &[], &labels, cb, strategy)
            }
            Self::Logistic { name, labels, features, intercept, coefficients } => {
                let labels = binary_labels(&labels)?;
                let model = LogisticScorer::new(name, intercept, coefficients)?;
                evaluate_model(&model, &features, &labels, cb, strategy)
            }
        }
    }
}

fn binary_labels(raw: &[i64]) -> AnalysisResult<Vec<u8>> {
    raw.iter()
        .enumerate()
        .map(|(index, &value)| match value {
            0 => Ok(0),
            1 => Ok(1),
            _ => Err(AnalysisError::InvalidLabel { index, value }),
        })
        .collect()
}

/// Result for one model. A failed model never cancels its siblings.
#[derive(Debug)]
pub struct ModelOutcome {
    pub model: String,
    pub result: AnalysisResult<EvaluationReport>,
}

impl ModelOutcome {
    pub fn to_json(&self) -> serde_json::Value {
        match &self.result {
            Ok(report) => serde_json::json!({ "model": self.model, "report": report }),
            Err(e) => serde_json::json!({ "model": self.model, "error": e.to_string() }),
        }
    }
}

/// Evaluate every model in parallel on the blocking pool.
/// Outcomes come back in input order.
pub async fn evaluate_all(
    inputs: Vec<ModelInput>,
    cb: CostBenefitMatrix,
    strategy: SweepStrategy,
    max_observations: usize,
) -> Vec<ModelOutcome> {
    let handles = inputs.into_iter().map(move |input| {
        let model = input.name().to_string();
        let observations = input.observations();
        let task = tokio::task::spawn_blocking(move || {
            if observations > max_observations {
                return Err(AnalysisError::TooLarge {
                    observations,
                    limit: max_observations,
                });
            }
            input.run(&cb, strategy)
        });
        async move {
            let result = match task.await {
                Ok(r) => r,
                Err(e) => Err(AnalysisError::from(e)),
            };
            ModelOutcome { model, result }
        }
    });

    futures_util::future::join_all(handles).await
}
