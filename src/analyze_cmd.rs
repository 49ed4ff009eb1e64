//! The `analyze` subcommand: the full log-to-diagram pipeline.
//!
//! Per-entry and per-template problems are logged and isolated; each export
//! failure affects that document only. The command reports the best
//! achievable result and only errors out when no input could be read.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::core::config::AnalyzerConfig;
use crate::core::model::LogLevel;
use crate::{SeqError, SeqResult, diagram, ingest, report, sequence, storage, template};

pub const OVERVIEW_FILE: &str = "overview_seq.md";
pub const DETAILED_FILE: &str = "detail_seq.md";
pub const JSON_EXPORT_FILE: &str = "output_seq.json";

#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub log_file: PathBuf,
    pub keyword: Option<String>,
    pub tag: Option<String>,
    pub level: Option<String>,
    pub template_file: Option<PathBuf>,
    pub test_id: Option<String>,
    pub config_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub max_events: Option<usize>,
    pub overview_limit: Option<usize>,
    pub csv: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs) -> SeqResult<()> {
    // Resolve configuration: file first, CLI flags override.
    let mut config = match &args.config_file {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(n) = args.max_events {
        config.max_events_per_diagram = n;
    }
    if let Some(n) = args.overview_limit {
        config.overview_event_limit = n;
    }
    if let Some(dir) = args.output_dir.clone() {
        config.output_dir = dir;
    }
    config.validate()?;

    let level = args.level.as_deref().map(parse_level).transpose()?;

    info!("loading template configuration");
    let templates = template::load_templates(args.template_file.as_deref());

    info!("reading log file {}", args.log_file.display());
    let lines = ingest::read_log_lines(&args.log_file)?;

    info!("parsing log entries");
    let parser = ingest::LineParser::new();
    let parsed = parser.parse_entries(&lines);
    let parsed_count = parsed.entries.len();
    let unparsed_count = parsed.unparsed.len();

    let entries = if args.keyword.is_some() || args.tag.is_some() || level.is_some() {
        info!("applying search filters");
        ingest::filter_entries(
            &parsed.entries,
            args.keyword.as_deref(),
            args.tag.as_deref(),
            level,
        )
    } else {
        parsed.entries
    };

    info!("generating sequence events");
    let synthesis = sequence::synthesize(&entries, &templates);
    let events = synthesis.events;

    for warning in sequence::validate_rules(&events, config.max_events_per_diagram) {
        warn!("{warning}");
    }
    let statistics = sequence::compute_statistics(&events);

    // Export phase: each document independently, collecting failures.
    let mut outputs: Vec<(&str, PathBuf)> = Vec::new();
    let mut failures: Vec<String> = Vec::new();

    if events.is_empty() {
        warn!("no sequence events generated; skipping diagram and JSON export");
    } else {
        info!("exporting sequence diagrams");
        let documents = [
            (
                "overview diagram",
                OVERVIEW_FILE,
                diagram::render_overview(&events, config.overview_event_limit),
            ),
            (
                "detailed diagram",
                DETAILED_FILE,
                diagram::render_detailed(&events, config.max_events_per_diagram),
            ),
        ];
        for (label, file, content) in documents {
            for missing in diagram::check_markup(&content) {
                warn!("{label}: {missing}");
            }
            let path = config.output_dir.join(file);
            match crate::write_atomic(&path, content.as_bytes()) {
                Ok(()) => outputs.push((label, path)),
                Err(e) => {
                    error!("failed to write {label}: {e}");
                    failures.push(format!("{label}: {e}"));
                }
            }
        }

        info!("exporting to JSON format");
        let json_path = config.output_dir.join(JSON_EXPORT_FILE);
        match storage::JsonExporter::new().export(
            &json_path,
            &events,
            Some(&entries),
            Some(&templates),
            &statistics,
        ) {
            Ok(()) => outputs.push(("json export", json_path)),
            Err(e) => {
                error!("failed to export JSON: {e}");
                failures.push(format!("json export: {e}"));
            }
        }

        if let Some(csv_path) = &args.csv {
            info!("exporting to CSV format");
            match storage::CsvExporter::new().export(&events, csv_path) {
                Ok(()) => outputs.push(("csv export", csv_path.clone())),
                Err(e) => {
                    error!("failed to export CSV: {e}");
                    failures.push(format!("csv export: {e}"));
                }
            }
        }
    }

    if let Some(test_id) = &args.test_id {
        info!("generating test evidence report");
        let reporter = report::EvidenceReporter::new(config.output_dir.clone());
        match reporter.generate(test_id, &args.log_file, &events, &entries, "Test Environment") {
            Ok(path) => outputs.push(("evidence report", path)),
            Err(e) => {
                error!("failed to generate evidence report: {e}");
                failures.push(format!("evidence report: {e}"));
            }
        }
    }

    // Human summary
    println!(
        "analyze: entries={parsed_count} (unparsed={unparsed_count}) filtered={} events={} unmatched={} templates={}",
        entries.len(),
        events.len(),
        synthesis.unmatched.len(),
        templates.len()
    );
    for (label, path) in &outputs {
        println!("  {label}: {}", path.display());
    }
    for failure in &failures {
        println!("  FAILED {failure}");
    }

    Ok(())
}

fn parse_level(code: &str) -> SeqResult<LogLevel> {
    LogLevel::from_code(code).ok_or_else(|| {
        SeqError::Message(format!(
            "unknown log level: {code} (expected V/D/I/W/E/F)"
        ))
    })
}
