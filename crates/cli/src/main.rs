//! propdedup CLI
//!
//! Deduplicates and filters tab-delimited property valuation datasets.

mod config;
mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use propdedup_core::{Engine, RunMode, RunReport};
use propdedup_formats::{open_dataset, OutputFormat, RecordWriter, TsvReader};
use std::io::{self, BufWriter, Read};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::RunConfig;
use progress::ProgressReporter;

/// Ingested records between progress updates
const PROGRESS_INTERVAL: usize = 1000;

#[derive(Parser)]
#[command(name = "propdedup")]
#[command(version, about = "Deduplicate and filter property valuation datasets", long_about = None)]
struct Cli {
    /// Tab-delimited dataset: id, address, town, valuation date, value (plain or .gz)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Mode: 1=keep-last, 2=keep-first, 3=keep-neither, 4=filtered-insert, 5=split-merge
    #[arg(value_name = "MODE", value_parser = parse_mode)]
    mode: RunMode,

    /// Config file (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record output format [text, jsonl]
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Sort modes 1-4 output by id and valuation date
    #[arg(long)]
    sorted: bool,

    /// Split-merge drops the last key from the second half
    #[arg(long)]
    legacy_boundary: bool,

    /// Print a run summary to stderr
    #[arg(long, conflicts_with = "json")]
    stats: bool,

    /// Print run statistics as JSON to stderr
    #[arg(long)]
    json: bool,

    /// Show a progress bar while reading
    #[arg(long)]
    progress: bool,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_mode(s: &str) -> std::result::Result<RunMode, String> {
    s.parse().map_err(|e: propdedup_core::Error| e.to_string())
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse().map_err(|e: propdedup_formats::Error| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for records
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(!cli.json)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    }
    .with_overrides(cli.format, cli.sorted, cli.legacy_boundary);

    run(&cli, &config)
}

fn run(cli: &Cli, config: &RunConfig) -> Result<()> {
    info!("Starting run");
    info!("  Input: {:?}", cli.input);
    info!("  Mode: {}", cli.mode);

    let mut reader = open_dataset(&cli.input)
        .with_context(|| format!("Failed to open dataset: {}", cli.input.display()))?;
    let mut engine = Engine::new(cli.mode, config.engine_config())?;

    let progress = cli
        .progress
        .then(|| ProgressReporter::new(reader.total_bytes()));

    ingest_dataset(&mut reader, &mut engine, |reader| {
        if let Some(ref progress) = progress {
            progress.update(reader.bytes_processed(), reader.stats());
        }
    })
    .with_context(|| format!("Failed to read dataset: {}", cli.input.display()))?;

    if let Some(ref progress) = progress {
        progress.finish();
    }

    let mut report = engine.finish()?;
    info!(
        "Read {} lines ({} skipped), {} records in output",
        reader.stats().lines_read,
        reader.stats().skipped(),
        report.records.len()
    );

    if config.output.sorted {
        sort_report(&mut report);
    }

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(BufWriter::new(stdout.lock()), config.output.format);
    writer.write_all(&report.records)?;
    writer.finish()?;

    if cli.json {
        let summary = serde_json::json!({
            "input": cli.input.to_string_lossy().to_string(),
            "reader": {
                "lines_read": reader.stats().lines_read,
                "records": reader.stats().records,
                "skipped_field_count": reader.stats().skipped_field_count,
                "skipped_invalid_id": reader.stats().skipped_invalid_id,
            },
            "run": &report.stats,
        });
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    } else if cli.stats {
        progress::print_summary_report(&cli.input, reader.stats(), &report.stats);
    }

    Ok(())
}

/// Feed every record into the engine, reporting progress every
/// [`PROGRESS_INTERVAL`] records
fn ingest_dataset<R: Read>(
    reader: &mut TsvReader<R>,
    engine: &mut Engine,
    mut on_progress: impl FnMut(&TsvReader<R>),
) -> propdedup_formats::Result<usize> {
    let mut ingested = 0;
    while let Some(result) = reader.next() {
        engine.ingest(result?);
        ingested += 1;
        if ingested % PROGRESS_INTERVAL == 0 {
            on_progress(&*reader);
        }
    }
    Ok(ingested)
}

/// Sort output by key; split-merge output keeps its half order
fn sort_report(report: &mut RunReport) {
    if report.mode != RunMode::SplitMerge {
        report.records.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use propdedup_core::EngineConfig;

    #[test]
    fn test_parse_valid_invocation() {
        let cli = Cli::try_parse_from(["propdedup", "homes.tsv", "4"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("homes.tsv"));
        assert_eq!(cli.mode, RunMode::FilteredInsert);
        assert!(!cli.stats);
    }

    #[test]
    fn test_mode_out_of_range() {
        for mode in ["0", "6", "42"] {
            let err = Cli::try_parse_from(["propdedup", "homes.tsv", mode])
                .err()
                .unwrap();
            assert_eq!(err.kind(), ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_mode_not_integer() {
        let err = Cli::try_parse_from(["propdedup", "homes.tsv", "five"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_missing_and_extra_arguments() {
        assert!(Cli::try_parse_from(["propdedup"]).is_err());
        assert!(Cli::try_parse_from(["propdedup", "homes.tsv"]).is_err());
        assert!(Cli::try_parse_from(["propdedup", "homes.tsv", "1", "extra"]).is_err());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "propdedup",
            "homes.tsv",
            "5",
            "--format",
            "jsonl",
            "--legacy-boundary",
            "--stats",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Jsonl));
        assert!(cli.legacy_boundary);
        assert!(cli.stats);

        assert!(Cli::try_parse_from(["propdedup", "homes.tsv", "1", "--format", "xml"]).is_err());
        assert!(Cli::try_parse_from(["propdedup", "homes.tsv", "1", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_stats_and_json_conflict() {
        let err = Cli::try_parse_from(["propdedup", "homes.tsv", "1", "--stats", "--json"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_progress_counts_records_not_lines() {
        let mut input = String::new();
        for i in 0..2500 {
            input.push_str("bad\tline\n");
            input.push_str(&format!("{}\t1 OAK ST\tX\t2020\t500000\n", i));
        }
        let mut reader = TsvReader::new(input.as_bytes());
        let mut engine = Engine::new(RunMode::KeepFirst, EngineConfig::default()).unwrap();

        let mut seen = Vec::new();
        let ingested = ingest_dataset(&mut reader, &mut engine, |reader| {
            seen.push(reader.stats().records)
        })
        .unwrap();

        assert_eq!(ingested, 2500);
        assert_eq!(seen, vec![1000, 2000]);
        assert_eq!(reader.stats().skipped(), 2500);
    }

    #[test]
    fn test_run_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "propdedup",
            dir.path().join("absent.tsv").to_str().unwrap(),
            "1",
        ])
        .unwrap();

        let err = run(&cli, &RunConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to open dataset"));
    }

    #[test]
    fn test_sort_report() {
        let input = "9\tA\tX\t2020\t1\n3\tB\tX\t2021\t1\n3\tC\tX\t2020\t1\n";
        let mut report = Engine::new(RunMode::KeepFirst, EngineConfig::default())
            .unwrap()
            .run(TsvReader::new(input.as_bytes()))
            .unwrap();

        sort_report(&mut report);

        let addresses: Vec<_> = report.records.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["C", "B", "A"]);
    }
}
