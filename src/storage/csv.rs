//! CSV export for sequence events.

use std::io::Write;
use std::path::Path;

use crate::SeqError;
use crate::core::model::SequenceEvent;

/// CSV column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "sequence_number",
    "timestamp",
    "from_entity",
    "to_entity",
    "message",
    "event_type",
    "template_priority",
    "level",
    "tag",
    "line_number",
    "time_since_previous_s",
];

/// CSV exporter for sequence events.
///
/// Exports the event collection with a flat column structure and
/// deterministic column order for easy comparison and analysis.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter
    }

    /// Export events to a CSV file.
    ///
    /// # Errors
    /// Returns an error if file operations or CSV writing fails.
    pub fn export(&self, events: &[SequenceEvent], output: &Path) -> Result<(), SeqError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SeqError::Message(format!("failed to create directory: {e}")))?;
            }
        }

        let file = std::fs::File::create(output)
            .map_err(|e| SeqError::Message(format!("failed to create file: {e}")))?;

        self.export_to_writer(events, file)
    }

    /// Export events to any writer implementing Write.
    pub fn export_to_writer<W: Write>(
        &self,
        events: &[SequenceEvent],
        writer: W,
    ) -> Result<(), SeqError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(CSV_HEADERS)
            .map_err(|e| SeqError::Message(format!("failed to write CSV headers: {e}")))?;

        for event in events {
            let row = self.event_to_row(event);
            csv_writer
                .write_record(&row)
                .map_err(|e| SeqError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| SeqError::Message(format!("failed to flush CSV writer: {e}")))?;

        Ok(())
    }

    fn event_to_row(&self, event: &SequenceEvent) -> Vec<String> {
        let meta = &event.metadata;
        vec![
            meta.sequence_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            event.timestamp.clone(),
            event.from_entity.clone(),
            event.to_entity.clone(),
            event.message.clone(),
            event.event_type.clone(),
            meta.template_priority.to_string(),
            meta.log_level.code().to_string(),
            meta.log_tag.clone(),
            event
                .log_entry
                .as_ref()
                .map(|e| e.line_number.to_string())
                .unwrap_or_default(),
            meta.time_since_previous
                .map(|s| format!("{s:.3}"))
                .unwrap_or_default(),
        ]
    }
}
