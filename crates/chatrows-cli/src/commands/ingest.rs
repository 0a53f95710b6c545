//! Ingest command - decode a chat webhook body and append its rows.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{info, warn};

use chatrows_core::events::WebhookPayload;
use chatrows_core::models::record::GroupedRecords;
use chatrows_core::sink::dispatch;
use chatrows_core::transcript::TranscriptParser;

use super::{grouped_csv, load_config, read_input, resolve_today};
use crate::sink::{row_count, CsvSink, HttpForwarder};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Webhook body (JSON), or `-` for stdin
    #[arg(required = true)]
    payload: String,

    /// Directory for per-destination CSV files (overrides config)
    #[arg(long)]
    sink_dir: Option<PathBuf>,

    /// Endpoint to POST each row to (overrides config)
    #[arg(long)]
    forward_url: Option<String>,

    /// Print the rows instead of writing them anywhere
    #[arg(long)]
    dry_run: bool,

    /// Date for records without one (dd/mm/yy, default: today)
    #[arg(long)]
    date: Option<String>,
}

pub async fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let parser = TranscriptParser::from_config(config.parser)?;
    let today = resolve_today(args.date.as_deref())?;

    let body = read_input(&args.payload)?;
    let payload = WebhookPayload::from_slice(&body)
        .map_err(|e| anyhow::anyhow!("Invalid webhook body: {}", e))?;

    let messages = payload.text_messages();
    info!(
        "Webhook carried {} events, {} text messages",
        payload.events.len(),
        messages.len()
    );

    // Each message is parsed on its own; records never span messages
    let mut batches: Vec<GroupedRecords> = Vec::with_capacity(messages.len());
    for message in &messages {
        let grouped = parser.parse_grouped_at(&message.text, today);
        if grouped.is_empty() {
            warn!(
                "No records in message from {}",
                message.source_id.as_deref().unwrap_or("unknown source")
            );
            continue;
        }
        batches.push(grouped);
    }

    if args.dry_run {
        for grouped in &batches {
            print!("{}", grouped_csv(grouped)?);
        }
        return Ok(());
    }

    let sink_dir = args.sink_dir.unwrap_or(config.sink.output_dir);
    let mut sink = CsvSink::new(&sink_dir)?;
    let forwarder = match args.forward_url.or(config.sink.forward_url) {
        Some(url) => Some(HttpForwarder::new(url, config.sink.timeout_secs)?),
        None => None,
    };

    let mut written = 0;
    let mut forwarded = 0;
    let mut destinations = BTreeSet::new();

    for grouped in &batches {
        written += dispatch(grouped, &mut sink)?;
        destinations.extend(grouped.groups.iter().map(|g| g.destination.clone()));

        if let Some(forwarder) = &forwarder {
            forwarded += forwarder.forward_all(grouped).await?;
        }
    }

    println!(
        "{} {} rows from {} messages written to {}",
        style("✓").green(),
        written,
        messages.len(),
        sink_dir.display()
    );
    for destination in &destinations {
        let path = sink.path_for(destination);
        println!("   {}: {} rows total", destination, row_count(&path)?);
    }
    if forwarder.is_some() {
        println!("{} {} rows forwarded", style("✓").green(), forwarded);
    }

    Ok(())
}
