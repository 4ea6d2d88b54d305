//! # wt-engine
//!
//! The Walltime orchestrator. Runs a batch of simulation trials, feeds each
//! measured wall time to the model service, and scores predictions.

pub mod config;
pub mod controller;
pub mod feedback;

#[cfg(test)]
mod testing;

pub use config::{OrchestratorConfig, SERVICE_URL_ENV};
pub use controller::{BatchSummary, TrialLoop, TrialPhase};
pub use feedback::{predict_all, train_all};
