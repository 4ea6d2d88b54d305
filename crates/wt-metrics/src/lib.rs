//! Regression metrics for prediction batches.
//!
//! Provides:
//! - [`MetricsAccumulator`]: per-model (true, predicted) sequences for one batch
//! - [`RegressionStats`]: single-pass MSE / RMSE / MAE / R² accumulation
//! - [`RegressionReport`]: the figures reported at batch end

pub mod accumulator;
pub mod regression;

pub use accumulator::MetricsAccumulator;
pub use regression::{RegressionReport, RegressionStats};
