#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seqtrace::{analyze_cmd, templates_cmd};

#[derive(Parser, Debug)]
#[command(name = "seqtrace")]
#[command(about = "Sequence diagram and test evidence generation from device logs", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set SEQTRACE_LOG)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a log file into sequence diagrams, JSON and evidence
    Analyze {
        /// Path to the log file (.txt, .log or .logcat)
        log_file: std::path::PathBuf,
        /// Search keyword in log messages (case-insensitive)
        #[arg(long)]
        keyword: Option<String>,
        /// Filter by log tag (exact match)
        #[arg(long)]
        tag: Option<String>,
        /// Filter by log level code and above (V/D/I/W/E/F)
        #[arg(long)]
        level: Option<String>,
        /// Custom template file (JSON)
        #[arg(long)]
        template_file: Option<std::path::PathBuf>,
        /// Test ID for evidence report generation
        #[arg(long)]
        test_id: Option<String>,
        /// Configuration file path (JSON)
        #[arg(long)]
        config: Option<std::path::PathBuf>,
        /// Base directory for generated documents
        #[arg(long)]
        output_dir: Option<std::path::PathBuf>,
        /// Maximum events per detailed diagram before pagination
        #[arg(long)]
        max_events: Option<usize>,
        /// Number of events shown in the overview diagram
        #[arg(long)]
        overview_limit: Option<usize>,
        /// Write a CSV export of the event collection to this file
        #[arg(long)]
        csv: Option<std::path::PathBuf>,
    },

    /// Load, validate and diagram the template configuration
    Templates {
        /// Custom template file (JSON)
        #[arg(long)]
        template_file: Option<std::path::PathBuf>,
        /// Output path for the template diagram
        #[arg(long, default_value = "template_seq_diagram.md")]
        output: std::path::PathBuf,
        /// Validate template business rules and fail on errors
        #[arg(long)]
        check: bool,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("SEQTRACE_LOG").unwrap_or_else(|_| {
        if verbose { "seqtrace=debug".to_string() } else { "seqtrace=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            log_file,
            keyword,
            tag,
            level,
            template_file,
            test_id,
            config,
            output_dir,
            max_events,
            overview_limit,
            csv,
        } => analyze_cmd::run(analyze_cmd::AnalyzeArgs {
            log_file,
            keyword,
            tag,
            level,
            template_file,
            test_id,
            config_file: config,
            output_dir,
            max_events,
            overview_limit,
            csv,
        }),
        Commands::Templates {
            template_file,
            output,
            check,
        } => templates_cmd::run(template_file, output, check),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
