//! The trial loop: sample, launch, extract, then train or predict.
//!
//! Trials run strictly one after another. Each trial waits on its external
//! job before the next one samples, and observations reach the model service
//! in trial order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

use wt_client::ModelService;
use wt_launch::{ExecutableLocator, JobRunner};
use wt_metrics::{MetricsAccumulator, RegressionReport};
use wt_sampler::{BatchMode, BatchProgress, ParameterSampler, TrialRecord};
use wt_types::{ConfigError, Observation, Outcome, Toolchain, WtResult};

use crate::config::OrchestratorConfig;
use crate::feedback::{predict_all, train_all};

/// Where the loop currently is within a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialPhase {
    Sampling,
    Building,
    Executing,
    Extracting,
    Training,
    Predicting,
    Done,
}

/// Everything a finished batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub progress: BatchProgress,
    pub trials: Vec<TrialRecord>,
    /// Per-model error figures; empty for training batches.
    pub reports: Vec<RegressionReport>,
    /// Service-side model descriptions fetched after a prediction batch.
    pub diagnostics: BTreeMap<String, serde_json::Value>,
}

/// Drives one batch of trials against a job runner and a model service.
pub struct TrialLoop<R: JobRunner, M: ModelService> {
    config: OrchestratorConfig,
    tools: Toolchain,
    sampler: ParameterSampler,
    runner: R,
    service: M,
    phase: TrialPhase,
    progress: BatchProgress,
}

impl<R: JobRunner, M: ModelService> TrialLoop<R, M> {
    /// Validate the configuration, locate the required executables, and
    /// build the loop. Nothing is launched if any of this fails.
    pub fn prepare(
        config: OrchestratorConfig,
        locator: &ExecutableLocator,
        runner: R,
        service: M,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let tools = locator.resolve(&config.tools, &config.topology)?;
        Self::with_tools(config, tools, runner, service)
    }

    /// Build the loop with tool paths that are already resolved.
    pub fn with_tools(
        config: OrchestratorConfig,
        tools: Toolchain,
        runner: R,
        service: M,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = match config.seed {
            Some(seed) => ParameterSampler::seeded(config.bounds, seed)?,
            None => ParameterSampler::new(config.bounds)?,
        };
        Ok(Self {
            progress: BatchProgress::new(config.mode, config.iterations),
            config,
            tools,
            sampler,
            runner,
            service,
            phase: TrialPhase::Sampling,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    /// Counters of the current or most recent batch. After a failed
    /// `run` this holds the failure and the trials completed before it.
    pub fn progress(&self) -> &BatchProgress {
        &self.progress
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn service(&self) -> &M {
        &self.service
    }

    /// Run the configured number of trials.
    ///
    /// Malformed job output skips that trial and the batch carries on.
    /// Launch failures and model service errors end the batch.
    pub async fn run(&mut self) -> WtResult<BatchSummary> {
        self.progress = BatchProgress::new(self.config.mode, self.config.iterations);
        let mut trials = Vec::with_capacity(self.config.iterations);
        let mut accumulator = MetricsAccumulator::new();

        self.progress.mark_running();
        info!(
            batch = %self.progress.id,
            mode = %self.config.mode,
            topology = self.config.topology.name(),
            iterations = self.config.iterations,
            service = %self.config.service_url,
            "starting batch"
        );

        for trial_number in 0..self.config.iterations {
            let batch_id = self.progress.id;
            match self.run_trial(batch_id, trial_number, &mut accumulator).await {
                Ok(trial) => {
                    self.progress.record(&trial);
                    trials.push(trial);
                }
                Err(e) => {
                    error!(trial = trial_number, error = %e, "batch aborted");
                    self.progress.mark_failed(e.to_string());
                    return Err(e);
                }
            }
        }
        self.phase = TrialPhase::Done;

        let (reports, diagnostics) = match self.config.mode {
            BatchMode::Train => (Vec::new(), BTreeMap::new()),
            BatchMode::Predict => {
                let diagnostics = self.describe_models(&accumulator).await;
                let reports = accumulator.finalize_all();
                for report in &reports {
                    info!("{report}");
                }
                (reports, diagnostics)
            }
        };

        self.progress.mark_completed();
        info!(
            batch = %self.progress.id,
            attempted = self.progress.attempted,
            succeeded = self.progress.succeeded,
            skipped = self.progress.skipped,
            "batch completed"
        );

        Ok(BatchSummary {
            progress: self.progress.clone(),
            trials,
            reports,
            diagnostics,
        })
    }

    async fn run_trial(
        &mut self,
        batch_id: wt_sampler::BatchId,
        trial_number: usize,
        accumulator: &mut MetricsAccumulator,
    ) -> WtResult<TrialRecord> {
        self.phase = TrialPhase::Sampling;
        let params = self.sampler.sample();
        let mut trial = TrialRecord::new(batch_id, trial_number, params);
        info!(trial = trial_number, %params, "running iteration");

        self.phase = TrialPhase::Building;
        let command = wt_launch::build(&self.config.topology, &params, &self.config.io, &self.tools);
        info!(trial = trial_number, command = %command, "launching job");

        self.phase = TrialPhase::Executing;
        trial.mark_running();
        let output = self.runner.run(&command).await?;
        trial.exit_code = output.exit_code;
        if !output.success() {
            // Extraction is still attempted: the simulator may have
            // reported its timing before exiting.
            warn!(trial = trial_number, exit_code = ?output.exit_code, "job exited unsuccessfully");
        }

        self.phase = TrialPhase::Extracting;
        let result = wt_launch::extract(&output.stdout);
        let seconds = match result.outcome {
            Outcome::Elapsed { seconds } => seconds,
            Outcome::Malformed { reason, line } => {
                warn!(
                    trial = trial_number,
                    %reason,
                    line = %line,
                    "there was an issue with this iteration, skipping"
                );
                debug!(trial = trial_number, stdout = %output.stdout, stderr = %output.stderr, "job output");
                trial.mark_skipped(reason.to_string());
                return Ok(trial);
            }
        };
        info!(trial = trial_number, seconds, "simulation run finished");

        let observation = Observation::new(params, seconds);
        match self.config.mode {
            BatchMode::Train => {
                self.phase = TrialPhase::Training;
                train_all(&self.service, self.config.feature_mapping, &observation).await?;
            }
            BatchMode::Predict => {
                self.phase = TrialPhase::Predicting;
                let predictions =
                    predict_all(&self.service, self.config.feature_mapping, &params).await?;
                accumulator.observe(seconds as f64, predictions);
            }
        }

        trial.mark_completed(seconds);
        Ok(trial)
    }

    /// Fetch each model's description for the batch report. Failures here
    /// only cost the diagnostic, not the batch. Listed models that never
    /// answered a prediction get a warning, since they will have no report.
    async fn describe_models(
        &self,
        accumulator: &MetricsAccumulator,
    ) -> BTreeMap<String, serde_json::Value> {
        let mut diagnostics = BTreeMap::new();
        let models = match self.service.list_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!(error = %e, "could not list models for diagnostics");
                return diagnostics;
            }
        };
        for model in models {
            if let Err(e) = accumulator.finalize(&model) {
                warn!(model = %model, error = %e, "model has no report");
            }
            match self.service.describe(&model).await {
                Ok(description) => {
                    info!(model = %model, description = %description, "model state");
                    diagnostics.insert(model, description);
                }
                Err(e) => warn!(model = %model, error = %e, "could not describe model"),
            }
        }
        diagnostics
    }
}
