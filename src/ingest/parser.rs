//! Line-to-entry parsing: regex extraction of timestamp/level/tag/message,
//! continuation-line consolidation, and search filtering.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::model::{LogEntry, LogLevel};
use crate::core::timeparse;
use crate::{SeqError, SeqResult};

/// Default logcat line pattern: timestamp, level code, tag, message.
pub const DEFAULT_LOG_PATTERN: &str =
    r"^(\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+(\w+):\s*(.*)$";

const SAMPLE_LINE: &str = "09-17 10:30:15.123 I ActivityManager: Starting activity";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub parsed_entries: usize,
    pub unparsed_lines: usize,
    pub success_rate: f64,
    pub level_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct ParsedLog {
    pub entries: Vec<LogEntry>,
    /// Lines that matched nothing and continued nothing
    pub unparsed: Vec<String>,
    pub stats: ParseStats,
}

/// Parser holding the compiled active log-line pattern.
#[derive(Debug)]
pub struct LineParser {
    pattern: String,
    compiled: Regex,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        LineParser {
            pattern: DEFAULT_LOG_PATTERN.to_string(),
            compiled: Regex::new(DEFAULT_LOG_PATTERN).expect("default log pattern"),
        }
    }

    pub fn with_pattern(pattern: &str) -> SeqResult<Self> {
        let compiled = Regex::new(pattern)
            .map_err(|e| SeqError::Message(format!("invalid log pattern: {e}")))?;
        Ok(LineParser {
            pattern: pattern.to_string(),
            compiled,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Replace the active pattern. The new pattern must compile; a pattern
    /// that does not match the standard sample line is accepted with a
    /// warning.
    pub fn set_pattern(&mut self, pattern: &str) -> SeqResult<()> {
        let compiled = Regex::new(pattern)
            .map_err(|e| SeqError::Message(format!("invalid log pattern: {e}")))?;
        if !compiled.is_match(SAMPLE_LINE) {
            warn!("pattern does not match the sample logcat line");
        }
        info!("log pattern updated from '{}' to '{pattern}'", self.pattern);
        self.pattern = pattern.to_string();
        self.compiled = compiled;
        Ok(())
    }

    /// Parse raw lines into structured entries.
    ///
    /// Lines that do not match the pattern and do not start with a timestamp
    /// are folded into the previous entry's message (multi-line
    /// consolidation); remaining non-matching lines are collected as
    /// unparsed diagnostics.
    pub fn parse_entries(&self, lines: &[String]) -> ParsedLog {
        info!("parsing {} log lines", lines.len());

        let mut entries: Vec<LogEntry> = Vec::new();
        let mut unparsed: Vec<String> = Vec::new();

        for (index, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let line_number = index + 1;

            if let Some(caps) = self.compiled.captures(line) {
                let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
                let level_code = group(2);
                let level = LogLevel::from_code(level_code).unwrap_or_else(|| {
                    warn!("unknown log level: {level_code}, defaulting to INFO");
                    LogLevel::Info
                });
                entries.push(LogEntry {
                    timestamp: group(1).to_string(),
                    level,
                    tag: group(3).to_string(),
                    message: group(4).to_string(),
                    original_line: line.to_string(),
                    line_number,
                });
            } else if !timeparse::has_millis_precision(line) {
                // A line without a leading timestamp continues the previous
                // entry, when there is one.
                match entries.last_mut() {
                    Some(last) => {
                        last.message.push(' ');
                        last.message.push_str(line);
                        last.original_line.push('\n');
                        last.original_line.push_str(line);
                    }
                    None => unparsed.push(line.to_string()),
                }
            } else {
                unparsed.push(line.to_string());
            }
        }

        let stats = parse_stats(&entries, &unparsed);
        info!(
            "parsing complete: {} entries, {} unparsed ({}% success)",
            stats.parsed_entries, stats.unparsed_lines, stats.success_rate
        );
        debug!("level distribution: {:?}", stats.level_distribution);

        ParsedLog {
            entries,
            unparsed,
            stats,
        }
    }
}

fn parse_stats(entries: &[LogEntry], unparsed: &[String]) -> ParseStats {
    let total = entries.len() + unparsed.len();
    let success_rate = if total > 0 {
        (entries.len() as f64 / total as f64 * 10000.0).round() / 100.0
    } else {
        0.0
    };

    let mut level_distribution = BTreeMap::new();
    for entry in entries {
        *level_distribution
            .entry(entry.level.code().to_string())
            .or_default() += 1;
    }

    ParseStats {
        total_lines: total,
        parsed_entries: entries.len(),
        unparsed_lines: unparsed.len(),
        success_rate,
        level_distribution,
    }
}

/// Filter entries by keyword (case-insensitive message substring), tag
/// (exact) and level (the given severity and above), AND semantics. With no
/// criteria the input is returned unchanged.
pub fn filter_entries(
    entries: &[LogEntry],
    keyword: Option<&str>,
    tag: Option<&str>,
    level: Option<LogLevel>,
) -> Vec<LogEntry> {
    if keyword.is_none() && tag.is_none() && level.is_none() {
        return entries.to_vec();
    }

    let keyword_lower = keyword.map(str::to_lowercase);
    let filtered: Vec<LogEntry> = entries
        .iter()
        .filter(|entry| {
            if let Some(k) = &keyword_lower {
                if !entry.message.to_lowercase().contains(k) {
                    return false;
                }
            }
            if let Some(t) = tag {
                if entry.tag != t {
                    return false;
                }
            }
            if let Some(l) = level {
                if entry.level.rank() < l.rank() {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();

    info!(
        "filtered {} entries from {} total",
        filtered.len(),
        entries.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parses_standard_lines() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&[
            "09-17 10:30:15.123 I ActivityManager: Starting activity",
            "09-17 10:30:15.456 D CameraService: Camera initialized",
        ]));

        assert_eq!(parsed.entries.len(), 2);
        let first = &parsed.entries[0];
        assert_eq!(first.timestamp, "09-17 10:30:15.123");
        assert_eq!(first.level, LogLevel::Info);
        assert_eq!(first.tag, "ActivityManager");
        assert_eq!(first.message, "Starting activity");
        assert_eq!(first.line_number, 1);
        assert_eq!(parsed.entries[1].level, LogLevel::Debug);
    }

    #[test]
    fn test_continuation_line_folds_into_previous_entry() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&[
            "09-17 10:30:15.123 E System: Exception occurred",
            "at com.example.Main(Main.java:10)",
        ]));

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(
            parsed.entries[0].message,
            "Exception occurred at com.example.Main(Main.java:10)"
        );
        assert!(parsed.entries[0].original_line.contains('\n'));
        assert!(parsed.unparsed.is_empty());
    }

    #[test]
    fn test_leading_orphan_line_is_unparsed() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&[
            "no entry before me",
            "09-17 10:30:15.123 I Tag: message",
        ]));

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.unparsed, vec!["no entry before me".to_string()]);
        assert_eq!(parsed.entries[0].line_number, 2);
    }

    #[test]
    fn test_unknown_level_defaults_to_info() {
        let parser = LineParser::new();
        let parsed =
            parser.parse_entries(&lines(&["09-17 10:30:15.123 Q OddTag: strange level"]));
        assert_eq!(parsed.entries[0].level, LogLevel::Info);
    }

    #[test]
    fn test_parse_stats() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&[
            "09-17 10:30:15.123 I Tag: one",
            "09-17 10:30:15.456 E Tag: two",
            "orphan line",
        ]));

        assert_eq!(parsed.stats.total_lines, 3);
        assert_eq!(parsed.stats.parsed_entries, 2);
        assert_eq!(parsed.stats.unparsed_lines, 1);
        assert!((parsed.stats.success_rate - 66.67).abs() < 0.01);
        assert_eq!(parsed.stats.level_distribution["I"], 1);
        assert_eq!(parsed.stats.level_distribution["E"], 1);
    }

    #[test]
    fn test_set_pattern_rejects_invalid_regex() {
        let mut parser = LineParser::new();
        assert!(parser.set_pattern("(unclosed").is_err());
        // Pattern unchanged after the failed update.
        assert_eq!(parser.pattern(), DEFAULT_LOG_PATTERN);
    }

    #[test]
    fn test_set_pattern_swaps_active_pattern() {
        let mut parser = LineParser::new();
        let custom = r"^(\S+)\s+\[(\w)\]\s+(\w+):\s*(.*)$";
        parser.set_pattern(custom).unwrap();
        assert_eq!(parser.pattern(), custom);

        let parsed = parser.parse_entries(&lines(&["ts1 [W] Net: timeout"]));
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].level, LogLevel::Warning);
    }

    #[test]
    fn test_filter_by_keyword_case_insensitive() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&[
            "09-17 10:30:15.123 I Cam: Camera started",
            "09-17 10:30:15.456 I Net: connection open",
        ]));

        let filtered = filter_entries(&parsed.entries, Some("CAMERA"), None, None);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].tag, "Cam");
    }

    #[test]
    fn test_filter_by_level_includes_higher_severity() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&[
            "09-17 10:30:15.123 D Cam: debug detail",
            "09-17 10:30:15.456 W Cam: warning",
            "09-17 10:30:15.789 F Cam: fatal",
        ]));

        let filtered = filter_entries(&parsed.entries, None, None, Some(LogLevel::Warning));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].level, LogLevel::Warning);
        assert_eq!(filtered[1].level, LogLevel::Fatal);
    }

    #[test]
    fn test_filter_criteria_combine_with_and() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&[
            "09-17 10:30:15.123 E Cam: camera failure",
            "09-17 10:30:15.456 E Net: network failure",
        ]));

        let filtered = filter_entries(&parsed.entries, Some("failure"), Some("Cam"), None);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].tag, "Cam");
    }

    #[test]
    fn test_no_criteria_returns_all() {
        let parser = LineParser::new();
        let parsed = parser.parse_entries(&lines(&["09-17 10:30:15.123 I Cam: m"]));
        assert_eq!(filter_entries(&parsed.entries, None, None, None).len(), 1);
    }
}
