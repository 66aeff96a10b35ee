//! Planning pipeline: wires the embedding collaborator to the matching
//! core and exposes a single transcript-in, plan-out entry point.

pub mod error;
pub mod planner;

pub use error::PipelineError;
pub use planner::BrollPlanner;
