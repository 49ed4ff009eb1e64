//! Mermaid sequence diagram rendering: overview and detailed documents,
//! with pagination of the detailed document above a configurable ceiling.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::core::model::SequenceEvent;
use crate::sequence::sanitize::sanitize_participant;

/// Render the overview document over the first `overview_limit` events.
pub fn render_overview(events: &[SequenceEvent], overview_limit: usize) -> String {
    let shown = &events[..events.len().min(overview_limit)];
    let participants = collect_participants(shown);

    let mut content = String::from("# Sequence Overview\n\n```mermaid\nsequenceDiagram\n");
    for p in &participants {
        let _ = writeln!(content, "    participant {p}");
    }
    content.push('\n');
    for event in shown {
        push_arrow(&mut content, event);
    }
    content.push_str("```\n\n");
    let _ = writeln!(
        content,
        "*Overview showing first {} events of {} total*",
        shown.len(),
        events.len()
    );
    content
}

/// Render the detailed document. Collections larger than
/// `max_events_per_diagram` are split into consecutive pages of that size,
/// each rendered as an independent detailed block.
pub fn render_detailed(events: &[SequenceEvent], max_events_per_diagram: usize) -> String {
    if events.len() > max_events_per_diagram {
        render_paginated(events, max_events_per_diagram)
    } else {
        render_detailed_block(events)
    }
}

fn render_paginated(events: &[SequenceEvent], page_size: usize) -> String {
    let total_pages = events.len().div_ceil(page_size);
    let mut content = String::from("# Detailed Sequence Diagram (Paginated)\n\n");
    for (page, chunk) in events.chunks(page_size).enumerate() {
        let _ = writeln!(content, "## Page {} of {}\n", page + 1, total_pages);
        content.push_str(&render_detailed_block(chunk));
        content.push('\n');
    }
    content
}

fn render_detailed_block(events: &[SequenceEvent]) -> String {
    let participants = collect_participants(events);

    let mut content = String::from("# Detailed Sequence Diagram\n\n```mermaid\nsequenceDiagram\n");
    for p in &participants {
        let _ = writeln!(content, "    participant {p}");
    }
    content.push('\n');

    for (i, event) in events.iter().enumerate() {
        // Timestamp annotation spanning the participant range every 10th event.
        if i % 10 == 0 {
            if let (Some(first), Some(last)) = (participants.first(), participants.last()) {
                let _ = writeln!(content, "    Note over {first},{last}: {}", event.timestamp);
            }
        }
        push_arrow(&mut content, event);
        if event.metadata.log_level.is_error() {
            let _ = writeln!(
                content,
                "    Note over {}: Error Event",
                sanitize_participant(&event.to_entity)
            );
        }
    }

    content.push_str("```\n\n");
    let _ = writeln!(
        content,
        "*Detailed view showing all {} events with timestamps*",
        events.len()
    );
    content
}

fn push_arrow(content: &mut String, event: &SequenceEvent) {
    let _ = writeln!(
        content,
        "    {}->>{}: {}",
        sanitize_participant(&event.from_entity),
        sanitize_participant(&event.to_entity),
        event.message
    );
}

/// Sanitized, deduplicated, alphabetically sorted participant set.
pub fn collect_participants(events: &[SequenceEvent]) -> Vec<String> {
    let mut set = BTreeSet::new();
    for event in events {
        set.insert(sanitize_participant(&event.from_entity));
        set.insert(sanitize_participant(&event.to_entity));
    }
    set.into_iter().collect()
}

/// Minimum structural validity for a sequence diagram document; returns the
/// markers that are missing.
pub fn check_markup(content: &str) -> Vec<String> {
    let mut missing = Vec::new();
    for marker in ["sequenceDiagram", "participant", "->>"] {
        if !content.contains(marker) {
            missing.push(format!("missing {marker} element"));
        }
    }
    missing
}
