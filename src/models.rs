//! Data models for the sales dashboard.
//!
//! This module contains the core data structures shared by ingestion,
//! aggregation, access control and the report views.

use crate::error::IngestNotice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One reporting interval, e.g. a calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Column prefix used by the data source (e.g. `sept24`).
    pub key: String,
    /// Human readable name (e.g. `September`).
    pub label: String,
}

impl Period {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    /// Name of the revenue column for this period.
    pub fn revenue_column(&self) -> String {
        format!("{}_rev_gen", self.key)
    }

    /// Name of the target column for this period.
    pub fn target_column(&self) -> String {
        format!("{}_target", self.key)
    }

    /// Name of the inquiry-count column for this period.
    pub fn inquiry_column(&self) -> String {
        format!("{}_inq_no", self.key)
    }
}

/// One row of the sales dataset.
///
/// The `revenue`, `target` and `inquiries` vectors are aligned with the
/// period list of the [`Dataset`] the record came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub agent_name: String,
    pub revenue: Vec<f64>,
    pub target: Vec<f64>,
    pub inquiries: Vec<u32>,
}

impl SalesRecord {
    /// Creates a record with every figure zeroed for `period_count` periods.
    pub fn zeroed(agent_name: impl Into<String>, period_count: usize) -> Self {
        Self {
            agent_name: agent_name.into(),
            revenue: vec![0.0; period_count],
            target: vec![0.0; period_count],
            inquiries: vec![0; period_count],
        }
    }
}

/// A normalized record set together with what ingestion had to say about it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub periods: Vec<Period>,
    pub records: Vec<SalesRecord>,
    /// Non-fatal advisories raised while normalizing columns.
    pub notices: Vec<IngestNotice>,
    /// Columns whose values could not be coerced to numbers.
    pub unusable_columns: BTreeSet<String>,
}

impl Dataset {
    /// An empty dataset, used when the fetch failed.
    pub fn empty(periods: Vec<Period>) -> Self {
        Self {
            periods,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Role granted by a successful authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees every agent's aggregated data.
    Admin,
    /// Sees exactly the one agent mapped to the username.
    #[serde(alias = "user")]
    Standard,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Standard => write!(f, "standard"),
        }
    }
}

/// Categorical performance label for a revenue/target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    NoTargetOrSalesData,
    TargetZeroUndefined,
    Critical,
    ExtremelyPoor,
    Poor,
    Deficient,
    HighRoller,
    SalesHero,
    TopAchiever,
    StarPerformer,
}

impl Rating {
    /// Every rating, worst band first.
    pub const ALL: [Rating; 10] = [
        Rating::NoTargetOrSalesData,
        Rating::TargetZeroUndefined,
        Rating::Critical,
        Rating::ExtremelyPoor,
        Rating::Poor,
        Rating::Deficient,
        Rating::HighRoller,
        Rating::SalesHero,
        Rating::TopAchiever,
        Rating::StarPerformer,
    ];

    /// The label shown to users and written to exports.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::NoTargetOrSalesData => "No Target Set or Sales Data",
            Rating::TargetZeroUndefined => "Target is zero; performance cannot be calculated.",
            Rating::Critical => "Critical",
            Rating::ExtremelyPoor => "Extremely Poor",
            Rating::Poor => "Poor",
            Rating::Deficient => "Deficient",
            Rating::HighRoller => "High Roller",
            Rating::SalesHero => "Sales Hero",
            Rating::TopAchiever => "Top Achievers",
            Rating::StarPerformer => "Star Performer",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Rating::ALL
            .into_iter()
            .find(|r| r.label() == trimmed)
            .ok_or_else(|| format!("unknown rating label: {trimmed}"))
    }
}

/// Derived per-agent figures. Never stored; recomputed on every view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub agent_name: String,
    pub total_revenue: f64,
    pub total_target: f64,
    pub rating: Rating,
}
