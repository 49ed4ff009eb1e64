//! The event-synthesis core: entity mapping, participant sanitization,
//! first-match-by-priority synthesis, and statistics over the result.

pub mod mapper;
pub mod sanitize;
pub mod stats;
pub mod synth;

// Re-export key entry points
pub use mapper::map_entity;
pub use sanitize::sanitize_participant;
pub use stats::{SequenceStatistics, TimingStats, compute_statistics, validate_rules};
pub use synth::{SynthesisReport, synthesize};
