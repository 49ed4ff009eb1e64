//! Aggregate statistics and structural rule validation over a finished
//! event collection. Validation annotates, it never mutates or rejects.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::model::SequenceEvent;
use crate::core::timeparse;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

/// Inter-event interval statistics in seconds, present when at least two
/// timestamps parse.
#[derive(Debug, Clone, Serialize)]
pub struct TimingStats {
    pub total_duration_secs: f64,
    pub average_interval_secs: f64,
    pub min_interval_secs: f64,
    pub max_interval_secs: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SequenceStatistics {
    pub total_events: usize,
    /// Event count per template name
    pub event_types: BTreeMap<String, usize>,
    /// Each event counts toward both its `from` and `to` participant
    pub participant_counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event: Option<String>,
}

pub fn compute_statistics(events: &[SequenceEvent]) -> SequenceStatistics {
    let mut stats = SequenceStatistics {
        total_events: events.len(),
        ..Default::default()
    };
    if events.is_empty() {
        return stats;
    }

    for event in events {
        *stats.event_types.entry(event.event_type.clone()).or_default() += 1;
        *stats
            .participant_counts
            .entry(event.from_entity.clone())
            .or_default() += 1;
        *stats
            .participant_counts
            .entry(event.to_entity.clone())
            .or_default() += 1;
    }

    stats.first_event = events.first().map(|e| e.timestamp.clone());
    stats.last_event = events.last().map(|e| e.timestamp.clone());
    stats.timing = compute_timing(events);
    stats
}

fn compute_timing(events: &[SequenceEvent]) -> Option<TimingStats> {
    let parsed: Vec<_> = events
        .iter()
        .filter_map(|e| timeparse::parse_timestamp(&e.timestamp))
        .collect();
    if parsed.len() < 2 {
        return None;
    }

    let intervals: Vec<f64> = parsed
        .windows(2)
        .map(|w| (w[1] - w[0]).as_seconds_f64())
        .collect();
    let total = (parsed[parsed.len() - 1] - parsed[0]).as_seconds_f64();
    let average = intervals.iter().sum::<f64>() / intervals.len() as f64;
    let min = intervals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = intervals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Some(TimingStats {
        total_duration_secs: total,
        average_interval_secs: average,
        min_interval_secs: min,
        max_interval_secs: max,
    })
}

/// Check the structural rules over a finished collection and return
/// warnings: millisecond timestamp precision, identifier-shaped entity
/// names, and the diagram size ceiling.
pub fn validate_rules(events: &[SequenceEvent], max_events_per_diagram: usize) -> Vec<String> {
    let mut warnings = Vec::new();

    for event in events {
        if !timeparse::has_millis_precision(&event.timestamp) {
            warnings.push(format!(
                "event '{}' has non-millisecond timestamp: {}",
                event.event_type, event.timestamp
            ));
        }
    }

    for event in events {
        for entity in [&event.from_entity, &event.to_entity] {
            if !IDENTIFIER.is_match(entity) {
                warnings.push(format!("invalid entity name: {entity}"));
            }
        }
    }

    if events.len() > max_events_per_diagram {
        warnings.push(format!(
            "event count {} exceeds diagram limit {max_events_per_diagram}",
            events.len()
        ));
    }

    warnings
}
