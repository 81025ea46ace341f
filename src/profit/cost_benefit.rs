use crate::errors::{AnalysisError, AnalysisResult};

/// Business payoff per outcome cell, indexed `[predicted][actual]` over
/// {Yes, No} x {Yes, No}:
///
///   [[TP, FP],
///    [FN, TN]]
///
/// For churn retention:
///   TP = reward for retaining a customer who would have churned
///   FP = cost of an incentive offered to a customer who would have stayed
///   FN = cost of losing a customer who could have been retained
///   TN = nothing happens
///
/// Stack-allocated, Copy. Entries are always finite.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct CostBenefitMatrix {
    cells: [[f64; 2]; 2],
}

impl CostBenefitMatrix {
    pub fn new(cells: [[f64; 2]; 2]) -> AnalysisResult<Self> {
        for (r, row) in cells.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(AnalysisError::InvalidCostBenefit(format!(
                        "cell [{r}][{c}] is not finite: {v}"
                    )));
                }
            }
        }
        Ok(Self { cells })
    }

    /// Retention payoff used when nothing else is configured:
    /// +80 retained churner, -20 wasted incentive, -100 lost churner, 0 otherwise.
    pub const fn churn_default() -> Self {
        Self {
            cells: [[80.0, -20.0], [-100.0, 0.0]],
        }
    }

    pub fn from_cells(tp: f64, fp: f64, fn_: f64, tn: f64) -> AnalysisResult<Self> {
        Self::new([[tp, fp], [fn_, tn]])
    }

    /// Parse `"tp,fp,fn,tn"` (whitespace around values is ignored).
    pub fn parse(s: &str) -> AnalysisResult<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|e| {
                    AnalysisError::InvalidCostBenefit(format!("{:?}: {e}", part.trim()))
                })
            })
            .collect::<AnalysisResult<Vec<f64>>>()?;

        match values.as_slice() {
            &[tp, fp, fn_, tn] => Self::from_cells(tp, fp, fn_, tn),
            other => Err(AnalysisError::InvalidCostBenefit(format!(
                "expected 4 values (tp,fp,fn,tn), got {}",
                other.len()
            ))),
        }
    }

    #[inline]
    pub fn as_array(&self) -> [[f64; 2]; 2] {
        self.cells
    }

    #[inline]
    pub fn true_positive(&self) -> f64 {
        self.cells[0][0]
    }

    #[inline]
    pub fn false_positive(&self) -> f64 {
        self.cells[0][1]
    }

    #[inline]
    pub fn false_negative(&self) -> f64 {
        self.cells[1][0]
    }

    #[inline]
    pub fn true_negative(&self) -> f64 {
        self.cells[1][1]
    }
}

impl TryFrom<[[f64; 2]; 2]> for CostBenefitMatrix {
    type Error = AnalysisError;

    fn try_from(cells: [[f64; 2]; 2]) -> AnalysisResult<Self> {
        Self::new(cells)
    }
}

impl From<CostBenefitMatrix> for [[f64; 2]; 2] {
    fn from(cb: CostBenefitMatrix) -> Self {
        cb.cells
    }
}

impl std::fmt::Display for CostBenefitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[[{}, {}], [{}, {}]]",
            self.true_positive(),
            self.false_positive(),
            self.false_negative(),
            self.true_negative()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_order() {
        let cb = CostBenefitMatrix::parse("80, -20, -100, 0").unwrap();
        assert_eq!(cb.true_positive(), 80.0);
        assert_eq!(cb.false_positive(), -20.0);
        assert_eq!(cb.false_negative(), -100.0);
        assert_eq!(cb.true_negative(), 0.0);
        assert_eq!(cb.as_array(), [[80.0, -20.0], [-100.0, 0.0]]);
    }

    #[test]
    fn test_parse_wrong_arity() {
        let err = CostBenefitMatrix::parse("1,2,3").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidCostBenefit(_)), "got {err}");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(CostBenefitMatrix::parse("1,x,3,4").is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(CostBenefitMatrix::from_cells(f64::NAN, 0.0, 0.0, 0.0).is_err());
        assert!(CostBenefitMatrix::from_cells(0.0, f64::INFINITY, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_serde_nested_array() {
        let cb: CostBenefitMatrix = serde_json::from_str("[[10, -10], [-5, 0]]").unwrap();
        assert_eq!(cb.false_negative(), -5.0);
        let json = serde_json::to_string(&cb).unwrap();
        assert_eq!(json, "[[10.0,-10.0],[-5.0,0.0]]");
    }
}
