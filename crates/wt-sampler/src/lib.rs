//! # wt-sampler
//!
//! Parameter sampling and trial tracking for Walltime.
//!
//! Provides a seedable sampler over validated x/y/z ranges and the records
//! that track each trial and the batch it belongs to.

mod sampler;
mod trial;

pub use sampler::ParameterSampler;
pub use trial::{BatchId, BatchMode, BatchProgress, BatchState, TrialRecord, TrialStatus};
