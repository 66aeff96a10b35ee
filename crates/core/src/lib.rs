//! Segment-to-clip semantic matching and constrained timeline assignment.
//!
//! Given timestamped transcript segments and candidate clips, both carrying
//! precomputed embedding vectors, produces an ordered timeline of narration
//! and clip-insertion segments that satisfies similarity, spacing, variety,
//! and count constraints. Purely a text/vector reasoning layer: it never
//! touches audio, video, or the network.

pub mod candidates;
pub mod engine;
pub mod error;
pub mod params;
pub mod selector;
pub mod similarity;
pub mod timeline;
pub mod types;

pub use engine::match_and_plan;
pub use error::CoreError;
pub use params::MatchParams;
pub use types::{ClipCandidate, NarrationSegment, TimelinePlan};
