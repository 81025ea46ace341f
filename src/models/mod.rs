pub mod logistic;
pub mod scores;

use crate::errors::AnalysisResult;

/// A fitted binary classifier, seen only through its probability output.
/// Fitting happens elsewhere; this crate never trains.
///
/// predict_proba() must be a pure function: one probability of the positive
/// class (churn) per feature row, each in [0, 1], rows in input order.
/// Send + Sync required for evaluation on the blocking pool.
pub trait ProbabilityModel: Send + Sync {
    fn name(&self) -> &str;

    fn predict_proba(&self, features: &[Vec<f64>]) -> AnalysisResult<Vec<f64>>;
}
