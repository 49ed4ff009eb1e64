//! Integration test for detailed-diagram pagination over a large synthesized
//! event collection.

use seqtrace::core::model::{LogEntry, LogLevel, Template, TemplateMapping};
use seqtrace::{diagram, sequence};

fn make_entries(count: usize) -> Vec<LogEntry> {
    (0..count)
        .map(|i| {
            let timestamp = format!("09-17 10:30:{:02}.{:03}", i / 1000, i % 1000);
            LogEntry {
                timestamp: timestamp.clone(),
                level: LogLevel::Info,
                tag: "Cam".to_string(),
                message: format!("tick {i}"),
                original_line: format!("{timestamp} I Cam: tick {i}"),
                line_number: i + 1,
            }
        })
        .collect()
}

fn tick_template() -> Template {
    Template {
        name: "Tick".to_string(),
        pattern: r"tick (\d+)".to_string(),
        mapping: TemplateMapping {
            from: "Clock".to_string(),
            to: "Camera".to_string(),
            message: "tick {group1}".to_string(),
        },
        priority: 1,
        description: String::new(),
    }
}

#[test]
fn test_1050_events_paginate_into_two_pages() {
    let entries = make_entries(1050);
    let report = sequence::synthesize(&entries, &[tick_template()]);
    assert_eq!(report.events.len(), 1050);

    let content = diagram::render_detailed(&report.events, 1000);

    assert!(content.starts_with("# Detailed Sequence Diagram (Paginated)"));
    assert!(content.contains("## Page 1 of 2"));
    assert!(content.contains("## Page 2 of 2"));
    assert!(!content.contains("## Page 3"));
    assert!(content.contains("*Detailed view showing all 1000 events with timestamps*"));
    assert!(content.contains("*Detailed view showing all 50 events with timestamps*"));

    // Concatenated pages carry every event exactly once, in order.
    let positions: Vec<usize> = (0..1050)
        .map(|i| {
            content
                .find(&format!("Clock->>Camera: tick {i}\n"))
                .unwrap_or_else(|| panic!("event {i} missing from paginated output"))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(content.matches("->>").count(), 1050);
}

#[test]
fn test_collection_at_limit_is_not_paginated() {
    let entries = make_entries(1000);
    let report = sequence::synthesize(&entries, &[tick_template()]);

    let content = diagram::render_detailed(&report.events, 1000);
    assert!(!content.contains("Paginated"));
    assert!(content.contains("*Detailed view showing all 1000 events with timestamps*"));
}

#[test]
fn test_size_ceiling_warning_accompanies_oversized_collection() {
    let entries = make_entries(1050);
    let report = sequence::synthesize(&entries, &[tick_template()]);

    let warnings = sequence::validate_rules(&report.events, 1000);
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("event count 1050 exceeds diagram limit 1000"))
    );
}
