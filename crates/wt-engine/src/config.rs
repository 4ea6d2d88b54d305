//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use wt_sampler::BatchMode;
use wt_types::{
    ConfigError, FeatureMapping, IoConfig, ParameterBounds, Topology, Toolchain, WtResult,
};

/// Environment variable that overrides [`OrchestratorConfig::service_url`].
pub const SERVICE_URL_ENV: &str = "WALLTIME_SERVICE_URL";

/// Everything a batch needs, loadable from JSON with any field omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Base URL of the model service.
    pub service_url: String,
    pub mode: BatchMode,
    /// Jobs to launch. Skipped trials still use one each.
    pub iterations: usize,
    pub bounds: ParameterBounds,
    pub topology: Topology,
    pub io: IoConfig,
    pub tools: Toolchain,
    pub feature_mapping: FeatureMapping,
    /// Fixed sampler seed for reproducible batches.
    pub seed: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost".to_string(),
            mode: BatchMode::Train,
            iterations: 20,
            bounds: ParameterBounds::default(),
            topology: Topology::default(),
            io: IoConfig::default(),
            tools: Toolchain::default(),
            feature_mapping: FeatureMapping::Faithful,
            seed: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> WtResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(SERVICE_URL_ENV).filter(|url| !url.is_empty()) {
            self.service_url = url;
        }
        self
    }

    pub fn with_mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_bounds(mut self, bounds: ParameterBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_io(mut self, io: IoConfig) -> Self {
        self.io = io;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_feature_mapping(mut self, mapping: FeatureMapping) -> Self {
        self.feature_mapping = mapping;
        self
    }

    /// Reject settings that would make the first trial fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate()?;

        let layout = self.topology.layout();
        if layout.nodes == 0 || layout.procs == 0 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "node and process counts must be positive (nodes={}, procs={})",
                    layout.nodes, layout.procs
                ),
            });
        }

        if let Topology::ScheduledContainerized {
            scheduler_verb,
            image,
            container_workdir,
            ..
        } = &self.topology
        {
            for (field, value) in [
                ("scheduler_verb", scheduler_verb),
                ("image", image),
                ("container_workdir", container_workdir),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        message: format!("scheduled topology requires a non-empty {field}"),
                    });
                }
            }
        }

        if self.service_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "service_url must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
