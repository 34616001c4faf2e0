//! Per-agent aggregation.
//!
//! Sums each agent's period figures into totals and attaches a rating.
//! Every agent is computed independently.

use crate::analysis::rating::rate;
use crate::models::{Dataset, PerformanceSummary, Rating, SalesRecord};
use std::collections::BTreeMap;

/// Total revenue and total target across every period of the record.
pub fn totals(record: &SalesRecord) -> (f64, f64) {
    (record.revenue.iter().sum(), record.target.iter().sum())
}

/// Total inquiries across every period of the record.
pub fn total_inquiries(record: &SalesRecord) -> u64 {
    record.inquiries.iter().map(|&n| u64::from(n)).sum()
}

/// Build the performance summary for one agent.
pub fn summarize(record: &SalesRecord) -> PerformanceSummary {
    let (total_revenue, total_target) = totals(record);

    PerformanceSummary {
        agent_name: record.agent_name.clone(),
        total_revenue,
        total_target,
        rating: rate(total_revenue, total_target),
    }
}

/// Summaries for every record, in dataset order.
pub fn summarize_all(dataset: &Dataset) -> Vec<PerformanceSummary> {
    dataset.records.iter().map(summarize).collect()
}

/// Count of agents per rating, worst band first. Ratings nobody holds are omitted.
pub fn rating_distribution(summaries: &[PerformanceSummary]) -> Vec<(Rating, usize)> {
    let mut counts: BTreeMap<Rating, usize> = BTreeMap::new();

    for summary in summaries {
        *counts.entry(summary.rating).or_default() += 1;
    }

    counts.into_iter().collect()
}
