pub mod errors;
pub mod job;
pub mod params;
pub mod topology;

pub use errors::*;
pub use job::*;
pub use params::*;
pub use topology::*;
