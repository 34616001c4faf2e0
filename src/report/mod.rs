//! Dashboard views.
//!
//! Builds the admin overview and the per-agent view from a dataset, and
//! renders them as Markdown, JSON or a CSV export.

pub mod export;
pub mod generator;

pub use export::{write_export, EXPORT_FILE_NAME};
pub use generator::{generate_admin_markdown, generate_agent_markdown, generate_json_report};

use crate::analysis::{rating_distribution, summarize, summarize_all, total_inquiries};
use crate::error::IngestNotice;
use crate::models::{Dataset, Period, PerformanceSummary, Rating, SalesRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Appended to totals and ratings computed over an unusable column.
pub const PARTIAL_MARK: &str = " (partial)";

/// Whether `column` holds real values.
pub fn is_usable(unusable_columns: &[String], column: &str) -> bool {
    !unusable_columns.iter().any(|c| c == column)
}

/// Whether any revenue or target column feeding the totals is unusable.
fn totals_partial(periods: &[Period], unusable_columns: &[String]) -> bool {
    periods.iter().any(|p| {
        !is_usable(unusable_columns, &p.revenue_column())
            || !is_usable(unusable_columns, &p.target_column())
    })
}

fn inquiries_partial(periods: &[Period], unusable_columns: &[String]) -> bool {
    periods
        .iter()
        .any(|p| !is_usable(unusable_columns, &p.inquiry_column()))
}

/// One line of the admin table.
#[derive(Debug, Clone, Serialize)]
pub struct AdminRow {
    pub record: SalesRecord,
    pub summary: PerformanceSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingCount {
    pub rating: Rating,
    pub agents: usize,
}

/// Everything the admin view shows.
#[derive(Debug, Clone, Serialize)]
pub struct AdminReport {
    pub generated_at: DateTime<Utc>,
    pub viewer: String,
    pub periods: Vec<Period>,
    pub rows: Vec<AdminRow>,
    pub rating_distribution: Vec<RatingCount>,
    pub unusable_columns: Vec<String>,
    /// Totals and ratings leave out at least one unusable column.
    pub totals_partial: bool,
    pub notices: Vec<IngestNotice>,
    /// Set when the fetch failed and the dataset is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl AdminReport {
    pub fn build(viewer: &str, dataset: &Dataset, fetch_error: Option<String>) -> Self {
        let summaries = summarize_all(dataset);
        let rating_distribution = rating_distribution(&summaries)
            .into_iter()
            .map(|(rating, agents)| RatingCount { rating, agents })
            .collect();

        let rows = dataset
            .records
            .iter()
            .cloned()
            .zip(summaries)
            .map(|(record, summary)| AdminRow { record, summary })
            .collect();

        let unusable_columns: Vec<String> = dataset.unusable_columns.iter().cloned().collect();

        Self {
            generated_at: Utc::now(),
            viewer: viewer.to_string(),
            periods: dataset.periods.clone(),
            rows,
            rating_distribution,
            totals_partial: totals_partial(&dataset.periods, &unusable_columns),
            unusable_columns,
            notices: dataset.notices.clone(),
            fetch_error,
        }
    }
}

/// Everything the agent view shows.
///
/// `record`, `summary` and `total_inquiries` are absent when the fetch
/// failed; `fetch_error` then says why.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub generated_at: DateTime<Utc>,
    pub viewer: String,
    pub periods: Vec<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<SalesRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PerformanceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_inquiries: Option<u64>,
    pub unusable_columns: Vec<String>,
    pub totals_partial: bool,
    pub inquiries_partial: bool,
    pub notices: Vec<IngestNotice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl AgentReport {
    pub fn build(viewer: &str, dataset: &Dataset, record: &SalesRecord) -> Self {
        let unusable_columns: Vec<String> = dataset.unusable_columns.iter().cloned().collect();

        Self {
            generated_at: Utc::now(),
            viewer: viewer.to_string(),
            periods: dataset.periods.clone(),
            record: Some(record.clone()),
            summary: Some(summarize(record)),
            total_inquiries: Some(total_inquiries(record)),
            totals_partial: totals_partial(&dataset.periods, &unusable_columns),
            inquiries_partial: inquiries_partial(&dataset.periods, &unusable_columns),
            unusable_columns,
            notices: dataset.notices.clone(),
            fetch_error: None,
        }
    }

    /// The degraded view shown when no data could be fetched.
    pub fn unavailable(viewer: &str, periods: &[Period], fetch_error: String) -> Self {
        Self {
            generated_at: Utc::now(),
            viewer: viewer.to_string(),
            periods: periods.to_vec(),
            record: None,
            summary: None,
            total_inquiries: None,
            unusable_columns: Vec::new(),
            totals_partial: false,
            inquiries_partial: false,
            notices: Vec::new(),
            fetch_error: Some(fetch_error),
        }
    }
}
