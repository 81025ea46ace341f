use super::curve::ProfitCurve;

/// Ready-to-plot profit curve: profit (y) against the percentage of
/// instances targeted, ordered by decreasing score (x).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlotSeries {
    pub percent_instances: Vec<f64>,
    pub profits: Vec<f64>,
}

/// Build the plot series. The x axis is a linear 0..=100 scale spanning the
/// curve length; a single point sits at 0.
pub fn plot_series(curve: &ProfitCurve) -> PlotSeries {
    PlotSeries {
        percent_instances: percent_axis(curve.len()),
        profits: curve.profits.clone(),
    }
}

fn percent_axis(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = 100.0 / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { 100.0 } else { i as f64 * step })
                .collect()
        }
    }
}
