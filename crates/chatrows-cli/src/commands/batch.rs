//! Batch processing command for multiple transcript files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{error, warn};

use chatrows_core::models::record::GroupedRecords;
use chatrows_core::transcript::rules::parse_payment_amount;
use chatrows_core::transcript::{decode_message, TranscriptParser};

use super::{grouped_csv, load_config, resolve_today};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of transcript files (e.g. "chats/*.txt")
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: BatchFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Date for records without one (dd/mm/yy, default: today)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum BatchFormat {
    /// Grouped JSON
    Json,
    /// CSV with a destination column
    Csv,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    grouped: Option<GroupedRecords>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let parser = TranscriptParser::from_config(config.parser)?;
    let today = resolve_today(args.date.as_deref())?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &parser, today);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(grouped) => results.push(FileResult {
                path,
                grouped: Some(grouped),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        grouped: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.grouped.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(grouped) = &result.grouped {
                write_file_output(output_dir, &result.path, grouped, args.format)?;
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:.1}s",
        style("✓").green().bold(),
        results.len(),
        start.elapsed().as_secs_f64()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    parser: &TranscriptParser,
    today: NaiveDate,
) -> anyhow::Result<GroupedRecords> {
    let body = fs::read(path)?;
    let text = decode_message(&body)?;
    Ok(parser.parse_grouped_at(text, today))
}

fn write_file_output(
    output_dir: &Path,
    source: &Path,
    grouped: &GroupedRecords,
    format: BatchFormat,
) -> anyhow::Result<()> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("transcript");

    let (extension, content) = match format {
        BatchFormat::Json => ("json", serde_json::to_string_pretty(grouped)?),
        BatchFormat::Csv => ("csv", grouped_csv(grouped)?),
    };

    fs::write(output_dir.join(format!("{}.{}", stem, extension)), content)?;
    Ok(())
}

/// Sum of parseable payment amounts across all records.
fn total_payment(grouped: &GroupedRecords) -> Decimal {
    grouped
        .rows()
        .filter_map(|(_, r)| parse_payment_amount(&r.payment))
        .sum()
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "records",
        "total_payment",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(grouped) = &result.grouped {
            wtr.write_record([
                filename,
                "success",
                &grouped.len().to_string(),
                &total_payment(grouped).to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
