pub mod confusion;
pub mod cost_benefit;
pub mod curve;
pub mod plot;
pub mod selector;

pub use confusion::{build_confusion, ConfusionMatrix};
pub use cost_benefit::CostBenefitMatrix;
pub use curve::{profit_curve, profit_curve_with, ProfitCurve, SweepStrategy};
pub use plot::{plot_series, PlotSeries};
pub use selector::{select_best, BestThreshold};

/// Final decision rule at a chosen threshold: 1 iff p > threshold.
///
/// Uses the same strict comparison as the profit sweep, so the reported
/// classification matches the confusion matrix the threshold was chosen from.
#[inline]
pub fn classify(probabilities: &[f64], threshold: f64) -> Vec<u8> {
    probabilities.iter().map(|&p| u8::from(p > threshold)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_strict() {
        assert_eq!(classify(&[0.9, 0.4, 0.4, 0.1], 0.4), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_classify_matches_curve_confusion() {
        let cb = CostBenefitMatrix::from_cells(10.0, -10.0, -5.0, 0.0).unwrap();
        let probs = [0.9, 0.6, 0.6, 0.4, 0.1];
        let labels = [1, 1, 0, 0, 0];
        let curve = profit_curve(&cb, &probs, &labels).unwrap();
        for (i, &t) in curve.thresholds.iter().enumerate() {
            let cm = build_confusion(&labels, &classify(&probs, t)).unwrap();
            assert_eq!(cm, curve.confusion[i], "threshold {t}");
        }
    }
}
