use crate::errors::{AnalysisError, AnalysisResult};
use crate::models::ProbabilityModel;
use crate::profit::{
    build_confusion, classify, plot_series, profit_curve_with, select_best, CostBenefitMatrix, ConfusionMatrix,
    PlotSeries, ProfitCurve, SweepStrategy,
};
use sha2::{Digest, Sha256};

/// Everything the caller needs after one evaluation: the chosen operating
/// point, the table at that point, and the full curve for plotting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EvaluationReport {
    pub model: String,
    pub observations: usize,
    pub positives: usize,
    pub strategy: SweepStrategy,
    pub cost_benefit: CostBenefitMatrix,
    pub best_threshold: f64,
    pub best_profit: f64,
    /// Confusion matrix from classifying every observation at the chosen threshold.
    pub confusion: ConfusionMatrix,
    pub predicted_positive: usize,
    /// Hex SHA-256 over the cost-benefit matrix, probabilities and labels.
    pub input_digest: String,
    pub curve: ProfitCurve,
    pub plot: PlotSeries,
}

/// Run the full pipeline on precomputed probabilities:
/// profit curve, best threshold, final classification at that threshold.
pub fn evaluate(
    model: &str,
    cb: &CostBenefitMatrix,
    probabilities: &[f64],
    labels: &[u8],
    strategy: SweepStrategy,
) -> AnalysisResult<EvaluationReport> {
    let curve = profit_curve_with(cb, probabilities, labels, strategy)?;
    let best = select_best(&curve.thresholds, &curve.profits)?;

    let predicted = classify(probabilities, best.threshold);
    let confusion = build_confusion(labels, &predicted)?;

    tracing::debug!(
        model,
        n = probabilities.len(),
        %strategy,
        threshold = best.threshold,
        profit = best.profit,
        "profit curve evaluated"
    );

    Ok(EvaluationReport {
        model: model.to_string(),
        observations: probabilities.len(),
        positives: labels.iter().filter(|&&y| y == 1).count(),
        strategy,
        cost_benefit: *cb,
        best_threshold: best.threshold,
        best_profit: best.profit,
        confusion,
        predicted_positive: confusion.predicted_positive() as usize,
        input_digest: input_digest(cb, probabilities, labels),
        plot: plot_series(&curve),
        curve,
    })
}

/// Score `features` with `model`, then evaluate.
pub fn evaluate_model(
    model: &dyn ProbabilityModel,
    features: &[Vec<f64>],
    labels: &[u8],
    cb: &CostBenefitMatrix,
    strategy: SweepStrategy,
) -> AnalysisResult<EvaluationReport> {
    let probabilities = model.predict_proba(features)?;
    if probabilities.len() != labels.len() {
        return Err(AnalysisError::ShapeMismatch {
            left: probabilities.len(),
            right: labels.len(),
        });
    }
    evaluate(model.name(), cb, &probabilities, labels, strategy)
}

fn input_digest(cb: &CostBenefitMatrix, probabilities: &[f64], labels: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for row in cb.as_array() {
        for v in row {
            hasher.update(v.to_le_bytes());
        }
    }
    for p in probabilities {
        hasher.update(p.to_le_bytes());
    }
    hasher.update(labels);
    format!("{:x}", hasher.finalize())
}
