//! Request and response bodies exchanged with the model service.

use serde::{Deserialize, Serialize};

use wt_types::Features;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// `POST /learn/{model}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnRequest {
    pub x: Features,
    pub y: u64,
}

/// `POST /predict/{model}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub x: Features,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// `null` when the model cannot predict yet.
    pub prediction: Option<f64>,
}
