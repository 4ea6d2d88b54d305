//! Execution topologies and the tool/IO settings a launch needs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Node and process counts shared by both topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLayout {
    /// Number of nodes (`-N`).
    pub nodes: u32,
    /// Processes per node for a direct launch, total tasks for the scheduler.
    pub procs: u32,
}

impl Default for ProcessLayout {
    fn default() -> Self {
        Self { nodes: 1, procs: 4 }
    }
}

/// Where and how a trial's simulation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Parallel launcher on the current host, run from the IO working directory.
    Direct { layout: ProcessLayout },
    /// Cluster scheduler wrapping an isolation runtime that executes the
    /// simulation inside a container image.
    ScheduledContainerized {
        layout: ProcessLayout,
        /// Scheduler sub-command, e.g. `run` or `submit`.
        scheduler_verb: String,
        /// Container image reference passed to the runtime.
        image: String,
        /// Working directory inside the container (`--pwd`).
        container_workdir: String,
    },
}

impl Topology {
    pub fn direct(nodes: u32, procs: u32) -> Self {
        Self::Direct {
            layout: ProcessLayout { nodes, procs },
        }
    }

    pub fn scheduled(
        nodes: u32,
        procs: u32,
        image: impl Into<String>,
        container_workdir: impl Into<String>,
    ) -> Self {
        Self::ScheduledContainerized {
            layout: ProcessLayout { nodes, procs },
            scheduler_verb: "run".to_string(),
            image: image.into(),
            container_workdir: container_workdir.into(),
        }
    }

    pub fn layout(&self) -> ProcessLayout {
        match self {
            Self::Direct { layout } | Self::ScheduledContainerized { layout, .. } => *layout,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::ScheduledContainerized { .. } => "scheduled",
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::Direct {
            layout: ProcessLayout::default(),
        }
    }
}

/// Names (or paths) of the external tools a launch depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Parallel launcher for the direct topology.
    pub launcher: String,
    /// Simulation executable on the host.
    pub simulator: String,
    /// Cluster scheduler front-end.
    pub scheduler: String,
    /// Container isolation runtime.
    pub runtime: String,
    /// Simulation executable path inside the container image. Never looked
    /// up on the host.
    pub container_simulator: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            launcher: "mpirun".to_string(),
            simulator: "lmp".to_string(),
            scheduler: "flux".to_string(),
            runtime: "singularity".to_string(),
            container_simulator: "/usr/bin/lmp".to_string(),
        }
    }
}

impl Toolchain {
    /// Host executables that must exist before a trial under `topology` can run.
    pub fn required_for(&self, topology: &Topology) -> Vec<&str> {
        match topology {
            Topology::Direct { .. } => vec![self.launcher.as_str(), self.simulator.as_str()],
            Topology::ScheduledContainerized { .. } => {
                vec![self.scheduler.as_str(), self.runtime.as_str()]
            }
        }
    }
}

/// Simulation inputs and outputs, independent of topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoConfig {
    /// Directory holding the simulation inputs.
    pub workdir: PathBuf,
    /// Log file the simulation writes (`-log`).
    pub log: String,
    /// Tokens following `-in`.
    pub inputs: Vec<String>,
}

impl IoConfig {
    /// Split a whitespace-separated input string (e.g. `"in.reaxc.hns -nocite"`).
    pub fn parse_inputs(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_string).collect()
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("/opt/lammps/examples/reaxff/HNS"),
            log: "/tmp/lammps.log".to_string(),
            inputs: Self::parse_inputs("in.reaxc.hns -nocite"),
        }
    }
}
