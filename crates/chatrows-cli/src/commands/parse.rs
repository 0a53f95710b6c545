//! Parse command - extract rows from a single transcript.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use chatrows_core::models::record::{GroupedRecords, OrderRecord};
use chatrows_core::transcript::{decode_message, TranscriptParser};

use super::{grouped_csv, load_config, read_input, records_csv, resolve_today};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Transcript file, or `-` for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Group records by order type
    #[arg(long)]
    grouped: bool,

    /// Date for records without one (dd/mm/yy, default: today)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let parser = TranscriptParser::from_config(config.parser)?;
    let today = resolve_today(args.date.as_deref())?;

    let body = read_input(&args.input)?;
    let text = match decode_message(&body) {
        Ok(text) => text,
        Err(e) => {
            warn!("Ignoring {}: {}", args.input, e);
            ""
        }
    };

    info!("Parsing {} bytes from {}", body.len(), args.input);

    let output = if args.grouped {
        format_grouped(&parser.parse_grouped_at(text, today), args.format)?
    } else {
        format_records(&parser.parse_at(text, today), args.format)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_records(records: &[OrderRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => records_csv(records),
        OutputFormat::Text => Ok(records.iter().map(format_text_line).collect::<Vec<_>>().join("\n")),
    }
}

fn format_grouped(grouped: &GroupedRecords, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(grouped)?),
        OutputFormat::Csv => grouped_csv(grouped),
        OutputFormat::Text => {
            let mut output = String::new();
            for group in &grouped.groups {
                output.push_str(&format!(
                    "{} -> {} ({} records)\n",
                    group.order_type,
                    group.destination,
                    group.records.len()
                ));
                for record in &group.records {
                    output.push_str(&format!("  {}\n", format_text_line(record)));
                }
            }
            Ok(output)
        }
    }
}

fn format_text_line(record: &OrderRecord) -> String {
    record.as_row().join(" | ")
}
