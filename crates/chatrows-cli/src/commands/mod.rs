//! Subcommands.

pub mod batch;
pub mod config;
pub mod ingest;
pub mod parse;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use chatrows_core::models::config::ChatrowsConfig;
use chatrows_core::models::record::{GroupedRecords, OrderRecord, ROW_HEADERS};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatrows")
        .join("config.json")
}

/// Explicit `--config` path, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ChatrowsConfig> {
    if let Some(path) = config_path {
        return Ok(ChatrowsConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(ChatrowsConfig::from_file(&default_path)?)
    } else {
        Ok(ChatrowsConfig::default())
    }
}

/// Read a whole file, or stdin when the path is `-`.
pub fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        let path = Path::new(input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        Ok(fs::read(path)?)
    }
}

/// `--date` override in the row format, else the local date.
pub fn resolve_today(date: Option<&str>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%d/%m/%y")
            .map_err(|e| anyhow::anyhow!("Invalid --date {} (expected dd/mm/yy): {}", d, e)),
        None => Ok(Local::now().date_naive()),
    }
}

/// CSV of flat records, header first.
pub fn records_csv(records: &[OrderRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(ROW_HEADERS)?;
    for record in records {
        wtr.write_record(record.as_row())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// CSV of grouped records with a leading destination column.
pub fn grouped_csv(grouped: &GroupedRecords) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["destination"];
    header.extend(ROW_HEADERS);
    wtr.write_record(&header)?;

    for (destination, record) in grouped.rows() {
        let mut row = vec![destination];
        row.extend(record.as_row());
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
