use super::ProbabilityModel;
use crate::errors::{AnalysisError, AnalysisResult};

/// Probabilities produced by an external model and handed over as-is.
///
/// The feature matrix is ignored except for its row count, which must match
/// the number of stored scores.
#[derive(Debug, Clone)]
pub struct PrecomputedScores {
    name: String,
    probabilities: Vec<f64>,
}

impl PrecomputedScores {
    pub fn new(name: impl Into<String>, probabilities: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            probabilities,
        }
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

impl ProbabilityModel for PrecomputedScores {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &[Vec<f64>]) -> AnalysisResult<Vec<f64>> {
        // An empty feature matrix means "score everything you hold".
        if !features.is_empty() && features.len() != self.probabilities.len() {
            return Err(AnalysisError::ShapeMismatch {
                left: features.len(),
                right: self.probabilities.len(),
            });
        }
        Ok(self.probabilities.clone())
    }
}
