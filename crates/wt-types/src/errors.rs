use thiserror::Error;

/// Main error type for the Walltime orchestrator
#[derive(Error, Debug)]
pub enum WtError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("Model service error: {0}")]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised before the first trial runs. Always fatal for the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Min value for {dimension} must be greater than or equal to 1, got {min}")]
    MinBelowOne { dimension: String, min: i64 },

    #[error("Max value for {dimension} must be greater than min ({min} >= {max})")]
    EmptyRange { dimension: String, min: i64, max: i64 },

    #[error("Cannot find required executable: {name}")]
    MissingExecutable { name: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors from preparing or launching an external job.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Command has no program to run")]
    EmptyCommand,

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors talking to the remote model service.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Model service unavailable at {url}: {message}")]
    Unavailable { url: String, message: String },

    #[error("Model service returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

/// Errors from finalizing accumulated metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("No predictions were accumulated for model {model}")]
    NoObservations { model: String },
}

/// Result type alias for Walltime operations
pub type WtResult<T> = Result<T, WtError>;
