use super::ProbabilityModel;
use crate::errors::{AnalysisError, AnalysisResult};
use statrs::function::logistic::logistic;

/// Applies an already-fitted logistic-regression model:
///
///   P(churn | x) = sigmoid(intercept + w . x)
///
/// Coefficients come from whatever fitted the model; nothing here trains.
#[derive(Debug, Clone)]
pub struct LogisticScorer {
    name: String,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticScorer {
    pub fn new(name: impl Into<String>, intercept: f64, coefficients: Vec<f64>) -> AnalysisResult<Self> {
        if coefficients.is_empty() {
            return Err(AnalysisError::EmptyInput("logistic coefficients"));
        }
        if !intercept.is_finite() || coefficients.iter().any(|w| !w.is_finite()) {
            return Err(AnalysisError::Parse("logistic coefficients must be finite".into()));
        }
        Ok(Self {
            name: name.into(),
            intercept,
            coefficients,
        })
    }

    #[inline]
    fn score_row(&self, row: &[f64]) -> f64 {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        logistic(z)
    }
}

impl ProbabilityModel for LogisticScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &[Vec<f64>]) -> AnalysisResult<Vec<f64>> {
        if features.is_empty() {
            return Err(AnalysisError::EmptyInput("feature matrix"));
        }
        features
            .iter()
            .map(|row| {
                if row.len() != self.coefficients.len() {
                    return Err(AnalysisError::ShapeMismatch {
                        left: row.len(),
                        right: self.coefficients.len(),
                    });
                }
                Ok(self.score_row(row))
            })
            .collect()
    }
}
