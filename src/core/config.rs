//! Analyzer configuration.
//!
//! Limits and the output directory are an explicit value handed to the
//! renderer and exporters at call time; nothing here is process-global.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{SeqError, SeqResult};

pub const DEFAULT_MAX_EVENTS_PER_DIAGRAM: usize = 1000;
pub const DEFAULT_OVERVIEW_EVENT_LIMIT: usize = 20;
pub const DEFAULT_OUTPUT_DIR: &str = "output_seq";

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Detailed diagrams above this event count are paginated
    pub max_events_per_diagram: usize,
    /// Number of events shown in the overview diagram
    pub overview_event_limit: usize,
    /// Base directory for generated documents
    pub output_dir: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            max_events_per_diagram: DEFAULT_MAX_EVENTS_PER_DIAGRAM,
            overview_event_limit: DEFAULT_OVERVIEW_EVENT_LIMIT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    max_events_per_diagram: Option<usize>,
    overview_event_limit: Option<usize>,
    output_dir: Option<PathBuf>,
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> SeqResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            SeqError::Message(format!("failed to read config {}: {e}", path.display()))
        })?;
        let raw: RawConfig = serde_json::from_str(&s).map_err(|e| {
            SeqError::Message(format!("invalid config {}: {e}", path.display()))
        })?;

        let mut config = AnalyzerConfig::default();
        if let Some(n) = raw.max_events_per_diagram {
            config.max_events_per_diagram = n;
        }
        if let Some(n) = raw.overview_event_limit {
            config.overview_event_limit = n;
        }
        if let Some(dir) = raw.output_dir {
            config.output_dir = dir;
        }
        config.validate()?;
        Ok(config)
    }

    /// Both limits must be positive integers.
    pub fn validate(&self) -> SeqResult<()> {
        if self.max_events_per_diagram == 0 {
            return Err(SeqError::Message(
                "max_events_per_diagram must be a positive integer".to_string(),
            ));
        }
        if self.overview_event_limit == 0 {
            return Err(SeqError::Message(
                "overview_event_limit must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
