//! Test evidence report generation.
//!
//! Produces a Markdown evidence document (summary, coverage metrics,
//! embedded sequence diagram, critical log tables) with a SHA-256 checksum,
//! plus a JSON metadata sidecar for the audit trail.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::core::model::{LogEntry, SequenceEvent};
use crate::core::timeparse;
use crate::sequence::sanitize::sanitize_participant;
use crate::{SeqError, SeqResult};

/// Events embedded in the report's diagram section.
const DIAGRAM_EVENT_LIMIT: usize = 10;
/// Log rows listed per evidence table.
const LOG_TABLE_LIMIT: usize = 20;

const CRITICAL_KEYWORDS: &[&str] = &["error", "fail", "exception", "critical", "fatal", "crash"];

#[derive(Debug, Clone, Serialize)]
pub struct CoverageMetrics {
    pub coverage_rate: f64,
    pub template_match_rate: f64,
    pub event_generation_rate: f64,
    pub log_processing_success: f64,
}

/// Evidence record persisted alongside the Markdown report.
#[derive(Debug, Clone, Serialize)]
pub struct TestEvidence {
    pub test_id: String,
    pub timestamp: String,
    pub environment: String,
    pub log_file_path: String,
    pub total_log_entries: usize,
    pub events_generated: usize,
    pub coverage_metrics: CoverageMetrics,
    pub sequence_diagram: String,
    pub critical_logs: Vec<LogEntry>,
    pub checksum: String,
}

pub struct EvidenceReporter {
    output_dir: PathBuf,
}

impl EvidenceReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        EvidenceReporter {
            output_dir: output_dir.into(),
        }
    }

    /// Generate the evidence report and its metadata sidecar; returns the
    /// report path.
    pub fn generate(
        &self,
        test_id: &str,
        log_file: &Path,
        events: &[SequenceEvent],
        entries: &[LogEntry],
        environment: &str,
    ) -> SeqResult<PathBuf> {
        info!("generating test evidence report for test ID: {test_id}");

        let generated_at = timeparse::rfc3339_now();
        let mut content = render_header(test_id, log_file, environment, &generated_at);
        let coverage = coverage_metrics(events, entries);
        content.push_str(&render_summary(events, entries, &coverage));
        content.push_str(&render_diagram_section(events));
        content.push_str(&render_log_evidence(entries));

        let report_path = self.output_dir.join(format!(
            "test_evidence_{test_id}_{}.md",
            filename_stamp()
        ));
        crate::write_atomic(&report_path, content.as_bytes())?;

        let checksum = crate::sha256_hex(content.as_bytes());
        debug!("evidence checksum: {checksum}");

        let evidence = TestEvidence {
            test_id: test_id.to_string(),
            timestamp: generated_at,
            environment: environment.to_string(),
            log_file_path: log_file.display().to_string(),
            total_log_entries: entries.len(),
            events_generated: events.len(),
            coverage_metrics: coverage,
            sequence_diagram: extract_mermaid_block(&content),
            critical_logs: critical_logs(entries)
                .into_iter()
                .take(LOG_TABLE_LIMIT)
                .cloned()
                .collect(),
            checksum,
        };

        let metadata_path = self
            .output_dir
            .join(format!("evidence_metadata_{test_id}.json"));
        let json = serde_json::to_vec_pretty(&evidence)
            .map_err(|e| SeqError::Message(format!("failed to serialize evidence: {e}")))?;
        crate::write_atomic(&metadata_path, &json)?;

        info!("test evidence report generated: {}", report_path.display());
        Ok(report_path)
    }
}

fn filename_stamp() -> String {
    let now = time::OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn render_header(test_id: &str, log_file: &Path, environment: &str, generated_at: &str) -> String {
    let mut s = String::from("# Test Evidence Report\n\n## Report Information\n\n");
    s.push_str("| Field | Value |\n|-------|-------|\n");
    let _ = writeln!(s, "| **Test ID** | {test_id} |");
    let _ = writeln!(s, "| **Generated** | {generated_at} |");
    let _ = writeln!(s, "| **Environment** | {environment} |");
    let _ = writeln!(s, "| **Log File** | {} |", log_file.display());
    s.push_str("| **Report Version** | 1.0 |\n| **Generator** | seqtrace |\n\n---\n\n");
    s
}

fn render_summary(
    events: &[SequenceEvent],
    entries: &[LogEntry],
    coverage: &CoverageMetrics,
) -> String {
    let critical = critical_logs(entries);
    let errors = error_logs(entries);

    let mut s = String::from("## Summary\n\n### Analysis Overview\n\n");
    s.push_str("| Metric | Value |\n|--------|-------|\n");
    let _ = writeln!(s, "| **Total Log Entries** | {} |", entries.len());
    let _ = writeln!(s, "| **Events Generated** | {} |", events.len());
    let _ = writeln!(s, "| **Coverage Rate** | {:.2}% |", coverage.coverage_rate);
    let _ = writeln!(s, "| **Critical Logs** | {} |", critical.len());
    let _ = writeln!(s, "| **Error Logs** | {} |", errors.len());

    s.push_str("\n### Coverage Metrics\n\n");
    let _ = writeln!(
        s,
        "- **Template Match Rate**: {:.2}%",
        coverage.template_match_rate
    );
    let _ = writeln!(
        s,
        "- **Event Generation Rate**: {:.2}%",
        coverage.event_generation_rate
    );
    let _ = writeln!(
        s,
        "- **Log Processing Success**: {:.2}%",
        coverage.log_processing_success
    );

    s.push_str("\n### Sequence Statistics\n\n");
    let event_types: std::collections::BTreeSet<&str> =
        events.iter().map(|e| e.event_type.as_str()).collect();
    let mut participants = std::collections::BTreeSet::new();
    for event in events {
        participants.insert(event.from_entity.as_str());
        participants.insert(event.to_entity.as_str());
    }
    let time_span = match (
        events.iter().map(|e| &e.timestamp).min(),
        events.iter().map(|e| &e.timestamp).max(),
    ) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "N/A".to_string(),
    };
    let _ = writeln!(s, "- **Total Events**: {}", events.len());
    let _ = writeln!(s, "- **Event Types**: {}", event_types.len());
    let _ = writeln!(s, "- **Unique Participants**: {}", participants.len());
    let _ = writeln!(s, "- **Time Span**: {time_span}");
    s.push_str("\n---\n\n");
    s
}

fn render_diagram_section(events: &[SequenceEvent]) -> String {
    if events.is_empty() {
        return "## Sequence Diagram\n\n*No sequence events generated*\n\n---\n\n".to_string();
    }

    let shown = &events[..events.len().min(DIAGRAM_EVENT_LIMIT)];
    let participants = crate::diagram::collect_participants(shown);

    let mut s = String::from("## Sequence Diagram\n\n```mermaid\nsequenceDiagram\n");
    for p in &participants {
        let _ = writeln!(s, "    participant {p}");
    }
    s.push('\n');
    for event in shown {
        let _ = writeln!(
            s,
            "    {}->>{}: {}",
            sanitize_participant(&event.from_entity),
            sanitize_participant(&event.to_entity),
            event.message
        );
    }
    s.push_str("```\n\n");

    if events.len() > DIAGRAM_EVENT_LIMIT {
        let _ = writeln!(
            s,
            "*Showing first {DIAGRAM_EVENT_LIMIT} events of {} total events*\n",
            events.len()
        );
    }
    s.push_str("---\n\n");
    s
}

fn render_log_evidence(entries: &[LogEntry]) -> String {
    let mut s = String::from("## Log Evidence\n\n");

    for (title, rows) in [
        ("Critical Log Entries", critical_logs(entries)),
        ("Error Log Entries", error_logs(entries)),
    ] {
        if rows.is_empty() {
            continue;
        }
        let _ = writeln!(s, "### {title}\n");
        s.push_str("| Timestamp | Level | Tag | Message |\n|-----------|-------|-----|----------|\n");
        for entry in rows.iter().take(LOG_TABLE_LIMIT) {
            let preview: String = entry.message.chars().take(100).collect();
            let _ = writeln!(
                s,
                "| {} | {} | {} | {preview}... |",
                entry.timestamp,
                entry.level.code(),
                entry.tag
            );
        }
        s.push('\n');
    }

    s.push_str("---\n");
    s
}

fn coverage_metrics(events: &[SequenceEvent], entries: &[LogEntry]) -> CoverageMetrics {
    let total_logs = entries.len();
    if total_logs == 0 {
        return CoverageMetrics {
            coverage_rate: 0.0,
            template_match_rate: 0.0,
            event_generation_rate: 0.0,
            log_processing_success: 0.0,
        };
    }

    let matched = events.iter().filter(|e| e.log_entry.is_some()).count();
    let template_match_rate = matched as f64 / total_logs as f64 * 100.0;
    let event_generation_rate = events.len() as f64 / total_logs as f64 * 100.0;
    let successful = entries.iter().filter(|e| !e.level.is_error()).count();
    let log_processing_success = successful as f64 / total_logs as f64 * 100.0;
    let coverage_rate =
        (template_match_rate + event_generation_rate + log_processing_success) / 3.0;

    CoverageMetrics {
        coverage_rate,
        template_match_rate,
        event_generation_rate,
        log_processing_success,
    }
}

/// Entries at error severity or mentioning a critical keyword.
fn critical_logs(entries: &[LogEntry]) -> Vec<&LogEntry> {
    entries
        .iter()
        .filter(|entry| {
            entry.level.is_error() || {
                let lower = entry.message.to_lowercase();
                CRITICAL_KEYWORDS.iter().any(|k| lower.contains(k))
            }
        })
        .collect()
}

fn error_logs(entries: &[LogEntry]) -> Vec<&LogEntry> {
    entries.iter().filter(|e| e.level.is_error()).collect()
}

fn extract_mermaid_block(content: &str) -> String {
    let mut in_block = false;
    let mut lines = Vec::new();
    for line in content.lines() {
        if line.contains("```mermaid") {
            in_block = true;
        } else if line.contains("```") && in_block {
            break;
        } else if in_block {
            lines.push(line);
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{EventMeta, LogLevel};

    fn entry(ts: &str, level: LogLevel, message: &str, line: usize) -> LogEntry {
        LogEntry {
            timestamp: ts.to_string(),
            level,
            tag: "Cam".to_string(),
            message: message.to_string(),
            original_line: message.to_string(),
            line_number: line,
        }
    }

    fn event(ts: &str, entry: &LogEntry) -> SequenceEvent {
        SequenceEvent {
            timestamp: ts.to_string(),
            from_entity: "Sys".to_string(),
            to_entity: "Cam".to_string(),
            message: "Go".to_string(),
            event_type: "Start".to_string(),
            metadata: EventMeta {
                template_name: "Start".to_string(),
                template_priority: 1,
                log_level: entry.level,
                log_tag: entry.tag.clone(),
                groups: Vec::new(),
                sequence_number: Some(1),
                time_since_previous: None,
            },
            log_entry: Some(entry.clone()),
        }
    }

    #[test]
    fn test_generate_writes_report_and_metadata_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = EvidenceReporter::new(dir.path());

        let entries = vec![
            entry("09-17 10:30:15.123", LogLevel::Info, "service start", 1),
            entry("09-17 10:30:15.456", LogLevel::Error, "hardware error", 2),
        ];
        let events = vec![event("09-17 10:30:15.123", &entries[0])];

        let report_path = reporter
            .generate("TC_001", Path::new("input.log"), &events, &entries, "Lab")
            .unwrap();

        let content = std::fs::read_to_string(&report_path).unwrap();
        assert!(content.starts_with("# Test Evidence Report"));
        assert!(content.contains("| **Test ID** | TC_001 |"));
        assert!(content.contains("sequenceDiagram"));
        assert!(content.contains("### Error Log Entries"));

        let sidecar = dir.path().join("evidence_metadata_TC_001.json");
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&sidecar).unwrap()).unwrap();
        assert_eq!(value["test_id"], "TC_001");
        assert_eq!(value["total_log_entries"], 2);
        assert_eq!(value["events_generated"], 1);
        assert_eq!(value["checksum"], crate::sha256_hex(content.as_bytes()));
        assert!(value["sequence_diagram"]
            .as_str()
            .unwrap()
            .contains("sequenceDiagram"));
    }

    #[test]
    fn test_coverage_metrics() {
        let entries = vec![
            entry("09-17 10:30:15.123", LogLevel::Info, "start", 1),
            entry("09-17 10:30:15.456", LogLevel::Error, "boom", 2),
        ];
        let events = vec![event("09-17 10:30:15.123", &entries[0])];

        let coverage = coverage_metrics(&events, &entries);
        assert!((coverage.template_match_rate - 50.0).abs() < 1e-9);
        assert!((coverage.event_generation_rate - 50.0).abs() < 1e-9);
        assert!((coverage.log_processing_success - 50.0).abs() < 1e-9);
        assert!((coverage.coverage_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_metrics_empty_input() {
        let coverage = coverage_metrics(&[], &[]);
        assert_eq!(coverage.coverage_rate, 0.0);
    }

    #[test]
    fn test_critical_logs_match_level_or_keyword() {
        let entries = vec![
            entry("09-17 10:30:15.123", LogLevel::Info, "all fine", 1),
            entry("09-17 10:30:15.456", LogLevel::Info, "Connection FAILED", 2),
            entry("09-17 10:30:15.789", LogLevel::Fatal, "gone", 3),
        ];
        let critical = critical_logs(&entries);
        assert_eq!(critical.len(), 2);
        assert_eq!(critical[0].line_number, 2);
        assert_eq!(error_logs(&entries).len(), 1);
    }

    #[test]
    fn test_diagram_section_caps_at_ten_events() {
        let source = entry("09-17 10:30:15.123", LogLevel::Info, "start", 1);
        let events: Vec<_> = (0..15)
            .map(|i| event(&format!("09-17 10:30:15.{i:03}"), &source))
            .collect();
        let section = render_diagram_section(&events);
        assert_eq!(section.matches("->>").count(), 10);
        assert!(section.contains("*Showing first 10 events of 15 total events*"));
    }

    #[test]
    fn test_diagram_section_empty_events() {
        let section = render_diagram_section(&[]);
        assert!(section.contains("*No sequence events generated*"));
    }
}
