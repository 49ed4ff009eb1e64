//! Sequence event synthesis: first-match-by-priority template scanning.

use regex::Regex;
use tracing::{debug, info, warn};

use crate::core::model::{EventMeta, LogEntry, SequenceEvent, Template};
use crate::core::timeparse;

use super::mapper::map_entity;

/// Batch outcome of a synthesis run.
///
/// Unmatched entries are diagnostics, not errors; they never appear in the
/// event collection. Matching and mapping are pure, so a single entry can
/// never invalidate events already synthesized from other entries.
#[derive(Debug, Default)]
pub struct SynthesisReport {
    /// Events sorted non-decreasing by timestamp string, enriched with
    /// sequence numbers and inter-event timing
    pub events: Vec<SequenceEvent>,
    /// Entries no template matched
    pub unmatched: Vec<LogEntry>,
}

/// Synthesize sequence events from parsed log entries.
///
/// Templates are stably sorted by ascending priority before scanning, so
/// equal priorities keep their supplied order; the first template whose
/// pattern is found in an entry's message wins. Patterns apply as a search,
/// not an anchored match. Templates whose patterns fail to compile are
/// skipped with a warning.
pub fn synthesize(entries: &[LogEntry], templates: &[Template]) -> SynthesisReport {
    info!(
        "generating sequence events from {} log entries using {} templates",
        entries.len(),
        templates.len()
    );

    let mut ordered: Vec<&Template> = templates.iter().collect();
    ordered.sort_by_key(|t| t.priority);

    let compiled: Vec<(&Template, Regex)> = ordered
        .into_iter()
        .filter_map(|t| match Regex::new(&t.pattern) {
            Ok(re) => Some((t, re)),
            Err(e) => {
                warn!("skipping template '{}' with invalid pattern: {e}", t.name);
                None
            }
        })
        .collect();

    let mut events = Vec::new();
    let mut unmatched = Vec::new();

    for entry in entries {
        let hit = compiled
            .iter()
            .find_map(|(t, re)| re.captures(&entry.message).map(|caps| (*t, caps)));

        match hit {
            Some((template, caps)) => {
                // Non-participating groups keep their slot as "" so that
                // group indices stay aligned with the pattern.
                let groups: Vec<String> = (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                events.push(build_event(entry, template, groups));
            }
            None => {
                debug!(
                    "no template match for line {}: {}",
                    entry.line_number,
                    entry.message.chars().take(50).collect::<String>()
                );
                unmatched.push(entry.clone());
            }
        }
    }

    // Lexical order over the fixed timestamp format; stable, so entries with
    // equal timestamps keep input order.
    events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    enrich(&mut events);

    info!(
        "generated {} sequence events, {} unmatched",
        events.len(),
        unmatched.len()
    );
    SynthesisReport { events, unmatched }
}

fn build_event(entry: &LogEntry, template: &Template, groups: Vec<String>) -> SequenceEvent {
    let from_entity = map_entity(&template.mapping.from, &groups);
    let to_entity = map_entity(&template.mapping.to, &groups);
    let message = map_entity(&template.mapping.message, &groups);

    SequenceEvent {
        timestamp: entry.timestamp.clone(),
        from_entity,
        to_entity,
        message,
        event_type: template.name.clone(),
        metadata: EventMeta {
            template_name: template.name.clone(),
            template_priority: template.priority,
            log_level: entry.level,
            log_tag: entry.tag.clone(),
            groups,
            sequence_number: None,
            time_since_previous: None,
        },
        log_entry: Some(entry.clone()),
    }
}

/// Assign dense 1-based sequence numbers in final order, and inter-event
/// timing where both adjacent timestamps parse.
fn enrich(events: &mut [SequenceEvent]) {
    for (i, event) in events.iter_mut().enumerate() {
        event.metadata.sequence_number = Some(i as u32 + 1);
    }
    for i in 1..events.len() {
        if let Some(secs) =
            timeparse::seconds_between(&events[i - 1].timestamp, &events[i].timestamp)
        {
            events[i].metadata.time_since_previous = Some(secs);
        }
    }
}
