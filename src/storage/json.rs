//! JSON export of sequence data with a metadata envelope.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::SeqError;
use crate::core::model::{LogEntry, SequenceEvent, Template};
use crate::core::timeparse;
use crate::sequence::stats::SequenceStatistics;

pub const EXPORT_VERSION: &str = "1.0";
pub const EXPORT_FORMAT: &str = "sequence_events";
pub const GENERATOR: &str = "seqtrace";

/// Default ceiling for a single export file.
pub const DEFAULT_MAX_EXPORT_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
struct ExportMetadata {
    export_timestamp: String,
    event_count: usize,
    version: &'static str,
    format: &'static str,
    generator: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_entry_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    metadata: ExportMetadata,
    sequence_events: &'a [SequenceEvent],
    #[serde(skip_serializing_if = "Option::is_none")]
    log_entries: Option<&'a [LogEntry]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    templates_used: Option<&'a [Template]>,
    statistics: &'a SequenceStatistics,
}

/// JSON exporter for the synthesized event collection.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    pretty: bool,
    max_file_size: u64,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        JsonExporter {
            pretty: true,
            max_file_size: DEFAULT_MAX_EXPORT_BYTES,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Export events (plus optional source entries and templates) to `path`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The event collection is empty
    /// - The serialized document exceeds the size ceiling
    /// - File operations fail, or the written file does not parse back
    pub fn export(
        &self,
        path: &Path,
        events: &[SequenceEvent],
        log_entries: Option<&[LogEntry]>,
        templates: Option<&[Template]>,
        statistics: &SequenceStatistics,
    ) -> Result<(), SeqError> {
        if events.is_empty() {
            return Err(SeqError::Message(
                "no sequence events to export".to_string(),
            ));
        }

        let document = ExportDocument {
            metadata: ExportMetadata {
                export_timestamp: timeparse::rfc3339_now(),
                event_count: events.len(),
                version: EXPORT_VERSION,
                format: EXPORT_FORMAT,
                generator: GENERATOR,
                log_entry_count: log_entries.map(<[LogEntry]>::len),
                template_count: templates.map(<[Template]>::len),
            },
            sequence_events: events,
            log_entries,
            templates_used: templates,
            statistics,
        };

        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        }
        .map_err(|e| SeqError::Message(format!("failed to serialize export: {e}")))?;

        if bytes.len() as u64 > self.max_file_size {
            return Err(SeqError::Message(format!(
                "export size {} exceeds limit {}",
                bytes.len(),
                self.max_file_size
            )));
        }

        crate::write_atomic(path, &bytes)?;
        self.validate_output(path)?;

        info!(
            "exported {} sequence events to {} ({} bytes)",
            events.len(),
            path.display(),
            bytes.len()
        );
        Ok(())
    }

    /// Re-read the written file and confirm it parses as JSON.
    fn validate_output(&self, path: &Path) -> Result<(), SeqError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SeqError::Message(format!("failed to re-read export: {e}")))?;
        if content.is_empty() {
            return Err(SeqError::Message("export file is empty".to_string()));
        }
        serde_json::from_str::<serde_json::Value>(&content)
            .map_err(|e| SeqError::Message(format!("export is not valid JSON: {e}")))?;
        debug!("validated JSON export at {}", path.display());
        Ok(())
    }
}
