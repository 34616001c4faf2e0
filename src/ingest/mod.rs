//! Sales data ingestion.
//!
//! Fetches the spreadsheet CSV export (or reads a local copy) and turns it
//! into a normalized [`Dataset`]. Each call is a single best-effort attempt;
//! nothing is retried.

pub mod normalize;

use crate::error::{FetchError, IngestNotice};
use crate::models::{Dataset, Period, SalesRecord};
use csv::StringRecord;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Column that identifies the agent on each row.
pub const AGENT_COLUMN: &str = "agent_name";

/// Where the sales CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Remote CSV endpoint, e.g. a published spreadsheet export URL.
    Remote { url: String, timeout_seconds: u64 },
    /// CSV file on disk.
    Local(PathBuf),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Remote { url, .. } => url.clone(),
            DataSource::Local(path) => path.display().to_string(),
        }
    }
}

/// Fetch and normalize the dataset from `source`.
pub async fn fetch_dataset(source: &DataSource, periods: &[Period]) -> Result<Dataset, FetchError> {
    let text = match source {
        DataSource::Remote {
            url,
            timeout_seconds,
        } => fetch_remote(url, *timeout_seconds).await?,
        DataSource::Local(path) => load_local(path).await?,
    };

    parse_dataset(&text, periods)
}

/// Perform one GET against the CSV endpoint and return the body.
pub async fn fetch_remote(url: &str, timeout_seconds: u64) -> Result<String, FetchError> {
    info!("Fetching sales data from {}", url);

    let request_error = |source: reqwest::Error| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(request_error)?;

    let response = client.get(url).send().await.map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(request_error)?;
    debug!("Received {} bytes of CSV", body.len());
    Ok(body)
}

/// Read a CSV file from disk.
pub async fn load_local(path: &Path) -> Result<String, FetchError> {
    info!("Reading sales data from {}", path.display());

    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Outcome of coercing one column across every row.
enum ColumnOutcome<T> {
    Missing,
    Converted(Vec<T>),
    Unconvertible(String),
}

fn convert_column<T>(
    rows: &[StringRecord],
    index: Option<usize>,
    parse: fn(Option<&str>) -> Option<T>,
) -> ColumnOutcome<T> {
    let Some(index) = index else {
        return ColumnOutcome::Missing;
    };

    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let cell = row.get(index);
        match parse(cell) {
            Some(value) => values.push(value),
            None => return ColumnOutcome::Unconvertible(cell.unwrap_or_default().to_string()),
        }
    }

    ColumnOutcome::Converted(values)
}

/// Parse CSV text into a normalized dataset.
///
/// Only a missing `agent_name` column or malformed CSV fails the whole
/// parse; every other problem is recorded as an [`IngestNotice`] on the
/// returned dataset.
pub fn parse_dataset(text: &str, periods: &[Period]) -> Result<Dataset, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let agent_index =
        index_of(AGENT_COLUMN).ok_or_else(|| FetchError::MissingColumn(AGENT_COLUMN.to_string()))?;

    let mut rows = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let agent = row.get(agent_index).unwrap_or_default();
        if agent.is_empty() {
            warn!("Skipping data row {} without an agent name", line + 1);
            continue;
        }
        rows.push(row);
    }

    let mut dataset = Dataset::empty(periods.to_vec());
    dataset.records = rows
        .iter()
        .map(|row| SalesRecord::zeroed(row.get(agent_index).unwrap_or_default(), periods.len()))
        .collect();

    for (slot, period) in periods.iter().enumerate() {
        for (column, is_revenue) in [
            (period.revenue_column(), true),
            (period.target_column(), false),
        ] {
            match convert_column(&rows, index_of(&column), normalize::parse_amount) {
                ColumnOutcome::Converted(values) => {
                    debug!("Normalized monetary column {}", column);
                    for (record, value) in dataset.records.iter_mut().zip(values) {
                        if is_revenue {
                            record.revenue[slot] = value;
                        } else {
                            record.target[slot] = value;
                        }
                    }
                }
                outcome => record_problem(&mut dataset, column, outcome),
            }
        }

        let column = period.inquiry_column();
        match convert_column(&rows, index_of(&column), normalize::parse_count) {
            ColumnOutcome::Converted(values) => {
                debug!("Normalized count column {}", column);
                for (record, value) in dataset.records.iter_mut().zip(values) {
                    record.inquiries[slot] = value;
                }
            }
            outcome => record_problem(&mut dataset, column, outcome),
        }
    }

    info!(
        "Loaded {} agent records across {} periods ({} advisories)",
        dataset.records.len(),
        periods.len(),
        dataset.notices.len()
    );

    Ok(dataset)
}

fn record_problem<T>(dataset: &mut Dataset, column: String, outcome: ColumnOutcome<T>) {
    let notice = match outcome {
        ColumnOutcome::Missing => IngestNotice::ColumnMissing { column },
        ColumnOutcome::Unconvertible(value) => {
            dataset.unusable_columns.insert(column.clone());
            IngestNotice::ColumnConversion { column, value }
        }
        ColumnOutcome::Converted(_) => return,
    };

    warn!("{}", notice);
    dataset.notices.push(notice);
}
