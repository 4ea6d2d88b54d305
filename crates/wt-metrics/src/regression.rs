//! Regression error statistics.
//!
//! [`RegressionStats`] folds (true, predicted) pairs one at a time and
//! produces a [`RegressionReport`] with MSE, RMSE, MAE and R².

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final error figures for one model over one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub model: String,
    /// Number of (true, predicted) pairs scored.
    pub count: usize,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// `None` when the true values have zero variance (including fewer than
    /// two observations), where R² is undefined.
    pub r2: Option<f64>,
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r2 = match self.r2 {
            Some(value) => value.to_string(),
            None => "undefined".to_string(),
        };
        writeln!(f, "Performance for: {} ({} predictions)", self.model, self.count)?;
        writeln!(f, "          R Squared Error: {r2}")?;
        writeln!(f, "       Mean Squared Error: {}", self.mse)?;
        writeln!(f, "      Mean Absolute Error: {}", self.mae)?;
        write!(f, "  Root Mean Squared Error: {}", self.rmse)
    }
}

/// One-pass accumulator over (true, predicted) pairs.
///
/// The true-value variance is tracked with Welford's update so R² does not
/// need a second pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegressionStats {
    count: usize,
    sum_squared_error: f64,
    sum_absolute_error: f64,
    truth_mean: f64,
    /// Sum of squared deviations of the true values from their mean.
    truth_m2: f64,
}

impl RegressionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, truth: f64, predicted: f64) {
        let residual = truth - predicted;
        self.count += 1;
        self.sum_squared_error += residual * residual;
        self.sum_absolute_error += residual.abs();

        let delta = truth - self.truth_mean;
        self.truth_mean += delta / self.count as f64;
        self.truth_m2 += delta * (truth - self.truth_mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Report for `model`, or `None` if nothing was observed.
    pub fn report(&self, model: &str) -> Option<RegressionReport> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        let mse = self.sum_squared_error / n;
        let r2 = (self.truth_m2 > 0.0).then(|| 1.0 - self.sum_squared_error / self.truth_m2);
        Some(RegressionReport {
            model: model.to_string(),
            count: self.count,
            mse,
            rmse: mse.sqrt(),
            mae: self.sum_absolute_error / n,
            r2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(pairs: &[(f64, f64)]) -> RegressionStats {
        let mut stats = RegressionStats::new();
        for &(truth, predicted) in pairs {
            stats.update(truth, predicted);
        }
        stats
    }

    #[test]
    fn perfect_predictions() {
        let report = stats(&[(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)])
            .report("m")
            .unwrap();
        assert_eq!(report.mse, 0.0);
        assert_eq!(report.rmse, 0.0);
        assert_eq!(report.mae, 0.0);
        assert_eq!(report.r2, Some(1.0));
    }

    #[test]
    fn constant_truth_leaves_r2_undefined() {
        let report = stats(&[(10.0, 5.0), (10.0, 15.0), (10.0, 10.0)])
            .report("m")
            .unwrap();
        assert_eq!(report.r2, None);
        assert!((report.mse - 50.0 / 3.0).abs() < 1e-12);
        assert!((report.mae - 10.0 / 3.0).abs() < 1e-12);
        assert!((report.rmse - (50.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_observation_leaves_r2_undefined() {
        let report = stats(&[(42.0, 40.0)]).report("m").unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.r2, None);
        assert_eq!(report.mse, 4.0);
    }

    #[test]
    fn r2_matches_definition() {
        // SS_res = 1, SS_tot = 2
        let report = stats(&[(1.0, 1.0), (2.0, 2.0), (3.0, 4.0)]).report("m").unwrap();
        assert_eq!(report.r2, Some(0.5));
    }

    #[test]
    fn r2_can_be_negative() {
        // Worse than predicting the mean.
        let report = stats(&[(1.0, 3.0), (3.0, 1.0)]).report("m").unwrap();
        assert!(report.r2.unwrap() < 0.0);
    }

    #[test]
    fn empty_stats_have_no_report() {
        assert!(RegressionStats::new().report("m").is_none());
    }

    #[test]
    fn display_marks_undefined_r2() {
        let report = stats(&[(7.0, 7.0)]).report("knn").unwrap();
        let text = report.to_string();
        assert!(text.contains("knn"));
        assert!(text.contains("R Squared Error: undefined"));
    }
}
