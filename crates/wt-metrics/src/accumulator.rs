//! Per-model collection of (true, predicted) pairs for a prediction batch.

use std::collections::BTreeMap;

use wt_types::MetricsError;

use crate::regression::{RegressionReport, RegressionStats};

/// Batch-scoped store of ground truth and model predictions.
///
/// Each successful trial contributes one true value and one prediction per
/// model that answered. Models that appear partway through a batch simply
/// have shorter sequences.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    truths: Vec<f64>,
    pairs: BTreeMap<String, Vec<(f64, f64)>>,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trial: its true value once, then each model's prediction.
    pub fn observe<I, S>(&mut self, truth: f64, predictions: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.truths.push(truth);
        for (model, predicted) in predictions {
            self.pairs
                .entry(model.into())
                .or_default()
                .push((truth, predicted));
        }
    }

    /// Number of trials observed.
    pub fn trials(&self) -> usize {
        self.truths.len()
    }

    pub fn truths(&self) -> &[f64] {
        &self.truths
    }

    pub fn pairs(&self, model: &str) -> &[(f64, f64)] {
        self.pairs.get(model).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.pairs.keys().map(String::as_str)
    }

    /// Error statistics for one model.
    pub fn finalize(&self, model: &str) -> Result<RegressionReport, MetricsError> {
        let mut stats = RegressionStats::new();
        for &(truth, predicted) in self.pairs(model) {
            stats.update(truth, predicted);
        }
        stats.report(model).ok_or_else(|| MetricsError::NoObservations {
            model: model.to_string(),
        })
    }

    /// Reports for every model seen, in name order. Consumes the batch state.
    pub fn finalize_all(self) -> Vec<RegressionReport> {
        self.pairs
            .keys()
            .filter_map(|model| self.finalize(model).ok())
            .collect()
    }
}
