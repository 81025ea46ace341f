use crate::errors::{AnalysisError, AnalysisResult};

/// The profit-maximizing point of a curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BestThreshold {
    pub index: usize,
    pub threshold: f64,
    pub profit: f64,
}

/// Pick the threshold with the highest profit.
///
/// Ties keep the first index in the given order; for a curve sorted by
/// descending threshold that is the highest threshold among maximizers.
pub fn select_best(thresholds: &[f64], profits: &[f64]) -> AnalysisResult<BestThreshold> {
    if thresholds.len() != profits.len() {
        return Err(AnalysisError::ShapeMismatch {
            left: thresholds.len(),
            right: profits.len(),
        });
    }
    let (&first_threshold, &first_profit) = match (thresholds.first(), profits.first()) {
        (Some(t), Some(p)) => (t, p),
        _ => return Err(AnalysisError::EmptyInput("thresholds and profits")),
    };

    let mut best = BestThreshold {
        index: 0,
        threshold: first_threshold,
        profit: first_profit,
    };
    for (index, (&threshold, &profit)) in thresholds.iter().zip(profits).enumerate().skip(1) {
        if profit > best.profit {
            best = BestThreshold { index, threshold, profit };
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profit::cost_benefit::CostBenefitMatrix;
    use crate::profit::curve::profit_curve;

    #[test]
    fn test_scenario_selects_perfect_separation() {
        let cb = CostBenefitMatrix::from_cells(10.0, -10.0, -5.0, 0.0).unwrap();
        let curve = profit_curve(&cb, &[0.9, 0.6, 0.4, 0.1], &[1, 1, 0, 0]).unwrap();
        let best = select_best(&curve.thresholds, &curve.profits).unwrap();
        assert_eq!(best.threshold, 0.4);
        assert!((best.profit - 5.0).abs() < 1e-12, "profit {}", best.profit);
        assert_eq!(best.index, 2);
    }

    #[test]
    fn test_perfect_classifier_identity_payoff() {
        let cb = CostBenefitMatrix::from_cells(1.0, 0.0, 0.0, 1.0).unwrap();
        let labels = [1, 0, 1, 0, 0, 1];
        let probs: Vec<f64> = labels.iter().map(|&y| f64::from(y)).collect();
        let curve = profit_curve(&cb, &probs, &labels).unwrap();
        let best = select_best(&curve.thresholds, &curve.profits).unwrap();
        assert_eq!(best.threshold, 0.0);
        assert!((best.profit - 1.0).abs() < 1e-12, "profit {}", best.profit);
    }

    #[test]
    fn test_ties_take_first() {
        let best = select_best(&[0.9, 0.7, 0.5, 0.3], &[1.0, 3.0, 3.0, 2.0]).unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.threshold, 0.7);
    }

    #[test]
    fn test_single_entry() {
        let best = select_best(&[0.5], &[-4.0]).unwrap();
        assert_eq!(best, BestThreshold { index: 0, threshold: 0.5, profit: -4.0 });
    }

    #[test]
    fn test_empty() {
        let err = select_best(&[], &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput(_)), "got {err}");
    }

    #[test]
    fn test_length_mismatch() {
        let err = select_best(&[0.5, 0.4], &[1.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::ShapeMismatch { .. }), "got {err}");
    }
}
