//! Client for the remote incremental-learning model service.
//!
//! The service owns all model state; this crate only knows how to list
//! models, send training observations, and request predictions.

pub mod client;
pub mod wire;

pub use client::{HttpModelClient, ModelService};
pub use wire::{LearnRequest, ModelsResponse, PredictRequest, PredictResponse};
