//! Commands, captured process output, and the outcomes extracted from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::params::TrialParameters;

/// A fully resolved external command: program, arguments, and working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Directory to run in; `None` inherits the orchestrator's.
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(argv: Vec<String>, working_dir: Option<PathBuf>) -> Self {
        Self { argv, working_dir }
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    /// Space-joined command line, for logging only.
    pub fn render(&self) -> String {
        self.argv.join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Text captured from a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Why a job's output could not be turned into a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MalformedReason {
    /// Output had no non-empty lines.
    EmptyOutput,
    /// Last line does not report a wall time.
    MissingMarker,
    /// Trailing token is not `H:M:S`.
    BadFieldCount { fields: usize },
    /// A component of the trailing token is not a non-negative integer.
    NonNumeric { component: String },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOutput => write!(f, "output is empty"),
            Self::MissingMarker => write!(f, "last line does not report total wall time"),
            Self::BadFieldCount { fields } => {
                write!(f, "expected 3 colon-separated fields, found {fields}")
            }
            Self::NonNumeric { component } => write!(f, "non-numeric time component {component:?}"),
        }
    }
}

/// Outcome of parsing a job's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Wall-clock duration in whole seconds.
    Elapsed { seconds: u64 },
    /// No usable duration; `line` is the offending last line (empty if none).
    Malformed { reason: MalformedReason, line: String },
}

/// Captured output of one trial plus what was extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub raw: String,
    pub outcome: Outcome,
}

impl JobResult {
    pub fn is_well_formed(&self) -> bool {
        matches!(self.outcome, Outcome::Elapsed { .. })
    }

    pub fn duration(&self) -> Option<u64> {
        match self.outcome {
            Outcome::Elapsed { seconds } => Some(seconds),
            Outcome::Malformed { .. } => None,
        }
    }
}

/// Ground truth from one successful trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub params: TrialParameters,
    pub seconds: u64,
}

impl Observation {
    pub fn new(params: TrialParameters, seconds: u64) -> Self {
        Self { params, seconds }
    }
}
