//! Data model shared by the synthesis, rendering and export layers.

use serde::{Deserialize, Serialize};

/// Log severity levels, serialized as the single-letter logcat codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "V")]
    Verbose,
    #[serde(rename = "D")]
    Debug,
    #[serde(rename = "I")]
    Info,
    #[serde(rename = "W")]
    Warning,
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "F")]
    Fatal,
}

impl LogLevel {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "V" => Some(LogLevel::Verbose),
            "D" => Some(LogLevel::Debug),
            "I" => Some(LogLevel::Info),
            "W" => Some(LogLevel::Warning),
            "E" => Some(LogLevel::Error),
            "F" => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "V",
            LogLevel::Debug => "D",
            LogLevel::Info => "I",
            LogLevel::Warning => "W",
            LogLevel::Error => "E",
            LogLevel::Fatal => "F",
        }
    }

    /// Severity rank for level filtering (a filter includes its level and up).
    pub fn rank(&self) -> u8 {
        match self {
            LogLevel::Verbose => 0,
            LogLevel::Debug => 1,
            LogLevel::Info => 2,
            LogLevel::Warning => 3,
            LogLevel::Error => 4,
            LogLevel::Fatal => 5,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal)
    }
}

/// One parsed log line. Immutable once produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Fixed lexical format `MM-DD HH:MM:SS.mmm`
    pub timestamp: String,
    pub level: LogLevel,
    pub tag: String,
    pub message: String,
    /// Raw input line(s), kept for evidence
    pub original_line: String,
    /// 1-based line number in the source file
    pub line_number: usize,
}

fn default_entity() -> String {
    "Unknown".to_string()
}

fn default_event_message() -> String {
    "Event".to_string()
}

/// Entity-mapping expressions of a template. Each value may contain
/// `{group<N>}` placeholders referencing the pattern's capture groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMapping {
    #[serde(default = "default_entity")]
    pub from: String,
    #[serde(default = "default_entity")]
    pub to: String,
    #[serde(default = "default_event_message")]
    pub message: String,
}

/// A named rule pairing a regex pattern with an entity mapping and a
/// priority (lower number = higher precedence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub pattern: String,
    #[serde(alias = "sequence_mapping")]
    pub mapping: TemplateMapping,
    pub priority: i32,
    #[serde(default)]
    pub description: String,
}

/// Typed event metadata. `sequence_number` and `time_since_previous` are
/// filled by the enrichment pass after the collection is sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMeta {
    pub template_name: String,
    pub template_priority: i32,
    pub log_level: LogLevel,
    pub log_tag: String,
    /// Raw capture group texts, in pattern order
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_since_previous: Option<f64>,
}

/// A single typed interaction derived from one matched log entry.
///
/// `from_entity` and `to_entity` hold the mapped strings as produced by the
/// entity mapper; participant sanitization happens at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceEvent {
    pub timestamp: String,
    pub from_entity: String,
    pub to_entity: String,
    pub message: String,
    /// Name of the template that matched
    pub event_type: String,
    pub metadata: EventMeta,
    /// Read-only association to the originating log entry
    pub log_entry: Option<LogEntry>,
}
