//! Row sinks: per-destination CSV files and HTTP forwarding.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use chatrows_core::error::SinkError;
use chatrows_core::models::record::{GroupedRecords, OrderRecord, ROW_HEADERS};
use chatrows_core::sink::RowSink;

/// Appends rows to `<dir>/<destination>.csv`, writing the header on creation.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(destination)))
    }
}

impl RowSink for CsvSink {
    fn append_record(&mut self, row: &OrderRecord, destination: &str) -> Result<(), SinkError> {
        let path = self.path_for(destination);
        let is_new = !path.exists();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if is_new {
            wtr.write_record(ROW_HEADERS).map_err(csv_error)?;
        }
        wtr.write_record(row.as_row()).map_err(csv_error)?;
        wtr.flush()?;

        debug!("Appended {} to {}", row.order_code, path.display());
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> SinkError {
    SinkError::Csv(e.to_string())
}

/// Destination names become file names; keep them to one path component.
fn file_stem(destination: &str) -> String {
    let stem: String = destination
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "unnamed".to_string() } else { stem }
}

#[derive(Serialize)]
struct ForwardedRow<'a> {
    destination: &'a str,
    row: [&'a str; 6],
}

/// Posts each row as `{"destination": ..., "row": [...]}` to one endpoint.
pub struct HttpForwarder {
    client: reqwest::Client,
    url: String,
}

impl HttpForwarder {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub async fn forward(&self, row: &OrderRecord, destination: &str) -> anyhow::Result<()> {
        let body = ForwardedRow {
            destination,
            row: row.as_row(),
        };

        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected {
                destination: destination.to_string(),
                reason: format!("HTTP {}", response.status()),
            }
            .into());
        }

        Ok(())
    }

    /// Forward every grouped row in order; stops at the first failure.
    pub async fn forward_all(&self, grouped: &GroupedRecords) -> anyhow::Result<usize> {
        let mut count = 0;
        for (destination, record) in grouped.rows() {
            self.forward(record, destination).await?;
            count += 1;
        }
        Ok(count)
    }
}

/// Count of data rows (header excluded) in a sink file, for summaries.
pub fn row_count(path: &Path) -> anyhow::Result<usize> {
    let mut rdr = csv::Reader::from_path(path)?;
    Ok(rdr.records().count())
}
