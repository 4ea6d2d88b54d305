//! Scripted stand-ins for the job runner and model service.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use wt_client::ModelService;
use wt_launch::JobRunner;
use wt_types::{CommandSpec, Features, LaunchError, ProcessOutput, ServiceError};

pub fn timed_output(line: &str) -> ProcessOutput {
    ProcessOutput {
        stdout: format!("Loop time of 12.5 on 4 procs\n{line}\n"),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

/// Replays queued outputs in order; once drained, reports a fixed wall time.
#[derive(Default)]
pub struct ScriptedRunner {
    script: Mutex<VecDeque<Result<ProcessOutput, LaunchError>>>,
    pub launched: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new(script: impl IntoIterator<Item = Result<ProcessOutput, LaunchError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn launches(&self) -> usize {
        self.launched.lock().unwrap().len()
    }
}

#[async_trait]
impl JobRunner for ScriptedRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, LaunchError> {
        self.launched.lock().unwrap().push(command.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(timed_output("Total wall time: 0:01:00")))
    }
}

/// In-memory model service. Every model predicts `prediction`.
#[derive(Default)]
pub struct RecordingService {
    pub models: Vec<String>,
    pub prediction: f64,
    pub fail_train: bool,
    pub list_calls: Mutex<usize>,
    pub trained: Mutex<Vec<(String, Features, u64)>>,
    pub predicted: Mutex<Vec<(String, Features)>>,
    pub described: Mutex<Vec<String>>,
}

impl RecordingService {
    pub fn with_models(models: &[&str]) -> Self {
        Self {
            models: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ModelService for RecordingService {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        *self.list_calls.lock().unwrap() += 1;
        Ok(self.models.clone())
    }

    async fn train(&self, model: &str, features: &Features, label: u64) -> Result<(), ServiceError> {
        if self.fail_train {
            return Err(ServiceError::Status {
                url: format!("http://stub/learn/{model}"),
                status: 500,
                body: "boom".into(),
            });
        }
        self.trained
            .lock()
            .unwrap()
            .push((model.to_string(), *features, label));
        Ok(())
    }

    async fn predict(&self, model: &str, features: &Features) -> Result<f64, ServiceError> {
        self.predicted
            .lock()
            .unwrap()
            .push((model.to_string(), *features));
        Ok(self.prediction)
    }

    async fn describe(&self, model: &str) -> Result<serde_json::Value, ServiceError> {
        self.described.lock().unwrap().push(model.to_string());
        Ok(serde_json::json!({ "name": model, "observations": self.trained.lock().unwrap().len() }))
    }
}
