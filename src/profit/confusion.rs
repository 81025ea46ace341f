use super::cost_benefit::CostBenefitMatrix;
use crate::errors::{AnalysisError, AnalysisResult};

/// 2x2 confusion matrix with a fixed cell order, independent of any
/// library's row/column convention:
///
///   [[TP, FP],
///    [FN, TN]]
///
/// Rows are the predicted class (Yes, No), columns the actual class (Yes, No),
/// matching `CostBenefitMatrix`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionMatrix {
    pub tp: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
    pub tn: u64,
}

impl ConfusionMatrix {
    /// Total observations counted. Always equals N for a valid build.
    #[inline]
    pub fn total(&self) -> u64 {
        self.tp + self.fp + self.fn_ + self.tn
    }

    #[inline]
    pub fn predicted_positive(&self) -> u64 {
        self.tp + self.fp
    }

    #[inline]
    pub fn as_array(&self) -> [[u64; 2]; 2] {
        [[self.tp, self.fp], [self.fn_, self.tn]]
    }

    /// Each cell divided by `n`. Caller guarantees `n > 0`.
    #[inline]
    pub fn normalized(&self, n: usize) -> [[f64; 2]; 2] {
        let n = n as f64;
        [
            [self.tp as f64 / n, self.fp as f64 / n],
            [self.fn_ as f64 / n, self.tn as f64 / n],
        ]
    }

    /// Expected profit per observation: sum over cells of
    /// (count / n) * payoff. Caller guarantees `n > 0`.
    #[inline]
    pub fn expected_profit(&self, cb: &CostBenefitMatrix, n: usize) -> f64 {
        let rates = self.normalized(n);
        let payoff = cb.as_array();
        let mut total = 0.0;
        for r in 0..2 {
            for c in 0..2 {
                total += rates[r][c] * payoff[r][c];
            }
        }
        total
    }
}

/// Count TP/FP/FN/TN from ground truth and predicted labels.
///
/// Both slices must have equal length and hold only 0 or 1.
pub fn build_confusion(labels: &[u8], predicted: &[u8]) -> AnalysisResult<ConfusionMatrix> {
    if labels.len() != predicted.len() {
        return Err(AnalysisError::ShapeMismatch {
            left: labels.len(),
            right: predicted.len(),
        });
    }

    let mut cm = ConfusionMatrix::default();
    for (index, (&actual, &pred)) in labels.iter().zip(predicted).enumerate() {
        match (pred, actual) {
            (1, 1) => cm.tp += 1,
            (1, 0) => cm.fp += 1,
            (0, 1) => cm.fn_ += 1,
            (0, 0) => cm.tn += 1,
            (0 | 1, value) => return Err(AnalysisError::InvalidLabel { index, value: value.into() }),
            (value, _) => return Err(AnalysisError::InvalidLabel { index, value: value.into() }),
        }
    }
    Ok(cm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_rules() {
        let labels = [1, 1, 0, 0, 1, 0];
        let predicted = [1, 0, 1, 0, 1, 0];
        let cm = build_confusion(&labels, &predicted).unwrap();
        assert_eq!(cm, ConfusionMatrix { tp: 2, fp: 1, fn_: 1, tn: 2 });
        assert_eq!(cm.as_array(), [[2, 1], [1, 2]]);
        assert_eq!(cm.total(), 6);
        assert_eq!(cm.predicted_positive(), 3);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = build_confusion(&[1, 0], &[1]).unwrap_err();
        assert!(
            matches!(err, AnalysisError::ShapeMismatch { left: 2, right: 1 }),
            "got {err}"
        );
    }

    #[test]
    fn test_invalid_label_in_truth() {
        let err = build_confusion(&[1, 2, 0], &[1, 0, 0]).unwrap_err();
        assert!(
            matches!(err, AnalysisError::InvalidLabel { index: 1, value: 2 }),
            "got {err}"
        );
    }

    #[test]
    fn test_invalid_label_in_prediction() {
        let err = build_confusion(&[1, 0], &[1, 7]).unwrap_err();
        assert!(
            matches!(err, AnalysisError::InvalidLabel { index: 1, value: 7 }),
            "got {err}"
        );
    }

    #[test]
    fn test_empty_is_all_zero() {
        let cm = build_confusion(&[], &[]).unwrap();
        assert_eq!(cm.total(), 0);
    }

    #[test]
    fn test_expected_profit_scenario() {
        let cm = ConfusionMatrix { tp: 2, fp: 0, fn_: 0, tn: 2 };
        let cb = CostBenefitMatrix::from_cells(10.0, -10.0, -5.0, 0.0).unwrap();
        assert_eq!(cm.normalized(4), [[0.5, 0.0], [0.0, 0.5]]);
        assert!((cm.expected_profit(&cb, 4) - 5.0).abs() < 1e-12);
    }
}
