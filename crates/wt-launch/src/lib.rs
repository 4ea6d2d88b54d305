//! # wt-launch
//!
//! Everything between a sampled parameter set and an extracted wall time:
//! command construction per topology, executable discovery, process
//! execution, and parsing of the simulator's output.

pub mod command;
pub mod executor;
pub mod extract;
pub mod locate;

pub use command::build;
pub use executor::{JobRunner, ProcessRunner};
pub use extract::{extract, parse_hms, WALL_TIME_MARKER};
pub use locate::ExecutableLocator;
