//! Profit curve: expected profit as a function of the decision threshold.
//!
//! The thresholds are the predicted probabilities themselves, sorted
//! descending with duplicates kept, so the curve has exactly one entry per
//! observation. The confusion matrix is piecewise-constant between
//! consecutive sorted probabilities, so these N points fully characterize it.
//!
//! Observation i is classified positive at threshold t iff P[i] > t.
//! At t = max(P) nothing is predicted positive.

use super::confusion::{build_confusion, ConfusionMatrix};
use super::cost_benefit::CostBenefitMatrix;
use crate::errors::{AnalysisError, AnalysisResult};

/// How the threshold sweep is computed. Both produce identical curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepStrategy {
    /// Rebuild the confusion matrix from scratch at every threshold. O(N^2).
    Exact,
    /// Sort once and carry running counts across thresholds. O(N log N).
    #[default]
    Cumulative,
}

impl std::fmt::Display for SweepStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Cumulative => write!(f, "cumulative"),
        }
    }
}

impl std::str::FromStr for SweepStrategy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> AnalysisResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "cumulative" => Ok(Self::Cumulative),
            other => Err(AnalysisError::Config(format!("unknown sweep strategy: {other}"))),
        }
    }
}

/// Parallel sequences, index-aligned, ordered by decreasing threshold.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProfitCurve {
    pub thresholds: Vec<f64>,
    pub profits: Vec<f64>,
    /// Confusion matrix behind each entry.
    pub confusion: Vec<ConfusionMatrix>,
}

impl ProfitCurve {
    #[inline]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            thresholds: Vec::with_capacity(n),
            profits: Vec::with_capacity(n),
            confusion: Vec::with_capacity(n),
        }
    }

    #[inline]
    fn push(&mut self, threshold: f64, cm: ConfusionMatrix, cb: &CostBenefitMatrix, n: usize) {
        self.thresholds.push(threshold);
        self.profits.push(cm.expected_profit(cb, n));
        self.confusion.push(cm);
    }
}

/// Check the preconditions shared by every sweep: non-empty, equal length,
/// labels in {0, 1}, probabilities finite and in [0, 1].
pub fn validate_inputs(probabilities: &[f64], labels: &[u8]) -> AnalysisResult<()> {
    if probabilities.is_empty() || labels.is_empty() {
        if probabilities.len() != labels.len() {
            return Err(AnalysisError::ShapeMismatch {
                left: probabilities.len(),
                right: labels.len(),
            });
        }
        return Err(AnalysisError::EmptyInput("probabilities and labels"));
    }
    if probabilities.len() != labels.len() {
        return Err(AnalysisError::ShapeMismatch {
            left: probabilities.len(),
            right: labels.len(),
        });
    }
    if let Some((index, &value)) = labels.iter().enumerate().find(|(_, &v)| v > 1) {
        return Err(AnalysisError::InvalidLabel { index, value: value.into() });
    }
    if let Some((index, &value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, &p)| !(0.0..=1.0).contains(&p))
    {
        return Err(AnalysisError::InvalidProbability { index, value });
    }
    Ok(())
}

/// Compute the profit curve with the reference O(N^2) sweep.
pub fn profit_curve(
    cb: &CostBenefitMatrix,
    probabilities: &[f64],
    labels: &[u8],
) -> AnalysisResult<ProfitCurve> {
    profit_curve_with(cb, probabilities, labels, SweepStrategy::Exact)
}

/// Compute the profit curve with an explicit sweep strategy.
pub fn profit_curve_with(
    cb: &CostBenefitMatrix,
    probabilities: &[f64],
    labels: &[u8],
    strategy: SweepStrategy,
) -> AnalysisResult<ProfitCurve> {
    validate_inputs(probabilities, labels)?;
    match strategy {
        SweepStrategy::Exact => exact_sweep(cb, probabilities, labels),
        SweepStrategy::Cumulative => Ok(cumulative_sweep(cb, probabilities, labels)),
    }
}

/// Descending copy of the probabilities. Inputs are validated finite.
fn sorted_descending(probabilities: &[f64]) -> Vec<f64> {
    let mut sorted = probabilities.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
}

fn exact_sweep(
    cb: &CostBenefitMatrix,
    probabilities: &[f64],
    labels: &[u8],
) -> AnalysisResult<ProfitCurve> {
    let n = probabilities.len();
    let mut curve = ProfitCurve::with_capacity(n);
    let mut predicted = vec![0u8; n];

    for t in sorted_descending(probabilities) {
        for (slot, &p) in predicted.iter_mut().zip(probabilities) {
            *slot = u8::from(p > t);
        }
        let cm = build_confusion(labels, &predicted)?;
        curve.push(t, cm, cb, n);
    }
    Ok(curve)
}

/// Walk observations by descending probability in groups of equal value.
/// Every member of a group shares one threshold and therefore one confusion
/// matrix: only observations from earlier (strictly greater) groups are
/// predicted positive.
fn cumulative_sweep(cb: &CostBenefitMatrix, probabilities: &[f64], labels: &[u8]) -> ProfitCurve {
    let n = probabilities.len();
    let positives = labels.iter().filter(|&&y| y == 1).count() as u64;
    let negatives = n as u64 - positives;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    let mut curve = ProfitCurve::with_capacity(n);
    let mut tp: u64 = 0;
    let mut fp: u64 = 0;
    let mut start = 0;

    while start < n {
        let t = probabilities[order[start]];
        let mut end = start;
        while end < n && probabilities[order[end]] == t {
            end += 1;
        }

        let cm = ConfusionMatrix {
            tp,
            fp,
            fn_: positives - tp,
            tn: negatives - fp,
        };
        for &i in &order[start..end] {
            curve.push(probabilities[i], cm, cb, n);
        }

        for &i in &order[start..end] {
            if labels[i] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
        }
        start = end;
    }
    curve
}
