use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use media_organizer_core::{
    render_summary, run_operation, DateGranularity, HashScope, OperationKind, RunOptions,
    RunReport, WalkOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "media-organizer",
    version,
    about = "Copy photos, videos, and documents into dated, typed, or sized folders without ever overwriting existing files."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Organize files into Year/Month[/Day] folders by capture date.
    ByDate(ByDateArgs),
    /// Separate photos and videos into Photos/ and Videos/ folders.
    ByType(CommonArgs),
    /// Sort documents into PDF/Word/Excel/PowerPoint/Text folders.
    Documents(CommonArgs),
    /// Sort files into size-bucket folders (<100MB up to 5GB+).
    BySize(CommonArgs),
    /// Find byte-identical media files and copy the extra copies aside.
    Duplicates(DuplicatesArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Source directory to organize.
    source: PathBuf,

    /// Destination root; created if absent, existing files never overwritten.
    dest: PathBuf,

    /// Exclude glob or substring patterns (repeatable).
    #[arg(long = "exclude", value_name = "PATTERN", num_args = 1.., action = ArgAction::Append)]
    exclude: Vec<String>,

    /// Maximum traversal depth (source root is depth 0).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Append placed media files to a SQLite catalog at this path.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Optional JSON report output path.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Skip writing summary.log and skipped_files.log to the destination.
    #[arg(long)]
    no_logs: bool,
}

#[derive(Debug, Args)]
struct ByDateArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Folder granularity: year/month or year/month/day.
    #[arg(long, value_enum, default_value = "month")]
    granularity: CliGranularity,
}

#[derive(Debug, Args)]
struct DuplicatesArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Restrict hashing to these extensions instead of the image/video default.
    #[arg(long = "extensions", value_name = "EXT", num_args = 1.., action = ArgAction::Append)]
    extensions: Vec<String>,

    /// Hash every file regardless of extension.
    #[arg(long, conflicts_with = "extensions")]
    all_files: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum CliGranularity {
    /// Year/Month folders.
    Month,
    /// Year/Month/Day folders.
    Day,
}

impl From<CliGranularity> for DateGranularity {
    fn from(value: CliGranularity) -> Self {
        match value {
            CliGranularity::Month => DateGranularity::YearMonth,
            CliGranularity::Day => DateGranularity::YearMonthDay,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::ByDate(args) => {
            let mut options = build_options(OperationKind::OrganizeByDate, &args.common);
            options.granularity = args.granularity.into();
            execute(options, &args.common)
        }
        Commands::ByType(args) => execute(build_options(OperationKind::SeparateByType, &args), &args),
        Commands::Documents(args) => {
            execute(build_options(OperationKind::OrganizeDocuments, &args), &args)
        }
        Commands::BySize(args) => execute(build_options(OperationKind::SortBySize, &args), &args),
        Commands::Duplicates(args) => {
            let mut options = build_options(OperationKind::FindDuplicates, &args.common);
            options.hash_scope = if args.all_files {
                HashScope::AllFiles
            } else if !args.extensions.is_empty() {
                HashScope::Extensions(args.extensions.clone())
            } else {
                HashScope::MediaDefault
            };
            execute(options, &args.common)
        }
    }
}

fn build_options(operation: OperationKind, args: &CommonArgs) -> RunOptions {
    let mut options = RunOptions::new(operation, args.source.clone(), args.dest.clone());
    options.walk = WalkOptions {
        excludes: args.exclude.clone(),
        max_depth: args.max_depth,
    };
    options.catalog_path = args.catalog.clone();
    options.write_logs = !args.no_logs;
    options
}

fn execute(options: RunOptions, args: &CommonArgs) -> Result<()> {
    let report = run_operation(&options)?;
    print!("{}", render_summary(&report));

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }

    if let Some(path) = &args.report {
        write_json_report(&report, path)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}

fn write_json_report(report: &RunReport, path: &PathBuf) -> Result<()> {
    let payload = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    fs::write(path, payload)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
