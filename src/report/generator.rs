//! Markdown and JSON rendering of the dashboard views.

use crate::error::IngestNotice;
use crate::models::{Period, SalesRecord};
use crate::report::export::{
    format_currency, format_currency_whole, money_cell, partial_mark, UNUSABLE_CELL,
};
use crate::report::{is_usable, AdminReport, AgentReport};
use anyhow::Result;
use serde::Serialize;

/// Width of the longest bar in the text chart.
const CHART_WIDTH: usize = 40;

/// Generate the admin dashboard.
pub fn generate_admin_markdown(report: &AdminReport) -> String {
    let mut output = String::new();

    output.push_str("# Admin Dashboard\n\n");
    output.push_str(&format!(
        "Welcome, {}! This is the admin panel where you can view all users' performance.\n\n",
        report.viewer
    ));
    output.push_str(&generate_generated_line(report.generated_at));
    output.push_str(&generate_fetch_error(report.fetch_error.as_deref()));
    output.push_str(&generate_notices_section(&report.notices));

    if report.rows.is_empty() {
        output.push_str("No data available to display.\n");
        return output;
    }

    output.push_str(&generate_admin_table(report));
    output.push_str(&generate_partial_note(
        report.totals_partial,
        &report.unusable_columns,
    ));
    output.push_str(&generate_distribution_section(report));

    output
}

fn generate_generated_line(at: chrono::DateTime<chrono::Utc>) -> String {
    format!("*Generated {}*\n\n", at.format("%Y-%m-%d %H:%M:%S UTC"))
}

fn generate_fetch_error(error: Option<&str>) -> String {
    match error {
        Some(e) => format!("> ❌ Error fetching data: {}\n\n", e),
        None => String::new(),
    }
}

/// Ingestion advisories, errors before warnings.
fn generate_notices_section(notices: &[IngestNotice]) -> String {
    if notices.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    let (errors, warnings): (Vec<_>, Vec<_>) = notices.iter().partition(|n| n.is_error());

    for notice in errors {
        section.push_str(&format!("> ❌ {}\n", notice));
    }
    for notice in warnings {
        section.push_str(&format!("> ⚠️ {}\n", notice));
    }
    section.push('\n');

    section
}

fn generate_admin_table(report: &AdminReport) -> String {
    let mut table = String::new();

    table.push_str("## Users' Monthly Performance Summary\n\n");

    let mut header = vec!["#".to_string(), "Agent Name".to_string()];
    header.extend(report.periods.iter().map(|p| format!("{} Revenue", p.label)));
    header.extend(report.periods.iter().map(|p| format!("{} Target", p.label)));
    header.extend(["Total Revenue", "Total Target", "Rating"].map(String::from));

    table.push_str(&format!("| {} |\n", header.join(" | ")));
    table.push_str(&format!("|{}\n", "---|".repeat(header.len())));

    for (index, row) in report.rows.iter().enumerate() {
        let mut cells = vec![(index + 1).to_string(), row.summary.agent_name.clone()];

        let unusable = &report.unusable_columns;
        for (slot, period) in report.periods.iter().enumerate() {
            cells.push(money_cell(unusable, &period.revenue_column(), row.record.revenue[slot]));
        }
        for (slot, period) in report.periods.iter().enumerate() {
            cells.push(money_cell(unusable, &period.target_column(), row.record.target[slot]));
        }

        let mark = partial_mark(report.totals_partial);
        cells.push(format!("{}{}", format_currency(row.summary.total_revenue), mark));
        cells.push(format!("{}{}", format_currency(row.summary.total_target), mark));
        cells.push(format!("{}{}", row.summary.rating, mark));

        table.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    table.push('\n');

    table
}

fn generate_partial_note(partial: bool, unusable_columns: &[String]) -> String {
    if !partial {
        return String::new();
    }

    format!(
        "> ⚠️ Figures marked{} leave out unusable columns: {}\n\n",
        crate::report::PARTIAL_MARK,
        unusable_columns.join(", ")
    )
}

fn generate_distribution_section(report: &AdminReport) -> String {
    let mut section = String::new();

    section.push_str("## Rating Distribution\n\n");
    section.push_str("| Rating | Agents |\n");
    section.push_str("|:---|:---:|\n");
    for count in &report.rating_distribution {
        section.push_str(&format!("| {} | {} |\n", count.rating, count.agents));
    }
    section.push('\n');

    section
}

/// Generate the agent dashboard: chart plus textual report.
pub fn generate_agent_markdown(report: &AgentReport) -> String {
    let mut output = String::new();

    output.push_str("# User Dashboard\n\n");
    output.push_str(&format!("Welcome, {}!\n\n", report.viewer));
    output.push_str(&generate_generated_line(report.generated_at));
    output.push_str(&generate_fetch_error(report.fetch_error.as_deref()));
    output.push_str(&generate_notices_section(&report.notices));

    let (Some(record), Some(summary)) = (&report.record, &report.summary) else {
        output.push_str("No data available to display.\n");
        return output;
    };

    output.push_str("## Revenue vs. Target Comparison\n\n");
    output.push_str("```text\n");
    output.push_str(&render_bar_chart(
        &report.periods,
        record,
        &report.unusable_columns,
    ));
    output.push_str("```\n\n");

    let mark = partial_mark(report.totals_partial);
    output.push_str("## User Report\n\n");
    output.push_str(&format!(
        "- **Total Revenue Generated:** {}{}\n",
        format_currency(summary.total_revenue),
        mark
    ));
    output.push_str(&format!(
        "- **Total Target Achieved:** {}{}\n",
        format_currency(summary.total_target),
        mark
    ));
    output.push_str(&format!(
        "- **Performance Rating:** {}{}\n",
        summary.rating, mark
    ));
    output.push_str(&format!(
        "- **Customer Inquiries:** {}{}\n",
        report.total_inquiries.unwrap_or_default(),
        partial_mark(report.inquiries_partial)
    ));
    output.push('\n');

    output.push_str(&generate_partial_note(
        report.totals_partial || report.inquiries_partial,
        &report.unusable_columns,
    ));

    output
}

/// Grouped horizontal bars: revenue and target per period, scaled to the largest amount.
///
/// Cells from unusable columns get no bar and read `n/a`.
pub fn render_bar_chart(
    periods: &[Period],
    record: &SalesRecord,
    unusable_columns: &[String],
) -> String {
    let cells: Vec<(Option<f64>, Option<f64>)> = periods
        .iter()
        .enumerate()
        .map(|(slot, period)| {
            let revenue = is_usable(unusable_columns, &period.revenue_column())
                .then(|| record.revenue[slot]);
            let target = is_usable(unusable_columns, &period.target_column())
                .then(|| record.target[slot]);
            (revenue, target)
        })
        .collect();

    let peak = cells
        .iter()
        .flat_map(|(revenue, target)| [*revenue, *target])
        .flatten()
        .fold(0.0_f64, f64::max);

    let label_width = periods
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);

    let bar = |value: Option<f64>| -> String {
        match value {
            Some(v) if peak > 0.0 && v > 0.0 => {
                let len = ((v / peak) * CHART_WIDTH as f64).round() as usize;
                "█".repeat(len.max(1))
            }
            _ => String::new(),
        }
    };
    let amount = |value: Option<f64>| -> String {
        value
            .map(format_currency_whole)
            .unwrap_or_else(|| UNUSABLE_CELL.to_string())
    };

    let mut chart = String::new();
    for (period, &(revenue, target)) in periods.iter().zip(&cells) {
        chart.push_str(&format!(
            "{:<width$}  Revenue {:<bar_width$} {}\n",
            period.label,
            bar(revenue),
            amount(revenue),
            width = label_width,
            bar_width = CHART_WIDTH
        ));
        chart.push_str(&format!(
            "{:<width$}  Target  {:<bar_width$} {}\n",
            "",
            bar(target),
            amount(target),
            width = label_width,
            bar_width = CHART_WIDTH
        ));
    }

    chart
}

/// Generate a JSON rendering of any view.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::{agent, sample_dataset};

    #[test]
    fn test_generate_admin_markdown() {
        let report = AdminReport::build("Admin", &sample_dataset(), None);
        let markdown = generate_admin_markdown(&report);

        assert!(markdown.contains("# Admin Dashboard"));
        assert!(markdown.contains("Welcome, Admin!"));
        assert!(markdown.contains("| 1 | Thomas |"));
        assert!(markdown.contains("$1,500.00"));
        assert!(markdown.contains("Star Performer"));
        assert!(markdown.contains("## Rating Distribution"));
    }

    #[test]
    fn test_admin_markdown_without_data() {
        let dataset = crate::models::Dataset::empty(sample_dataset().periods);
        let report = AdminReport::build("Admin", &dataset, Some("HTTP 500".to_string()));
        let markdown = generate_admin_markdown(&report);

        assert!(markdown.contains("Error fetching data: HTTP 500"));
        assert!(markdown.contains("No data available to display."));
        assert!(!markdown.contains("Rating Distribution"));
    }

    #[test]
    fn test_notices_errors_first() {
        let notices = vec![
            IngestNotice::ColumnMissing {
                column: "nov24_inq_no".to_string(),
            },
            IngestNotice::ColumnConversion {
                column: "oct24_target".to_string(),
                value: "soon".to_string(),
            },
        ];
        let section = generate_notices_section(&notices);
        let error_at = section.find("oct24_target").unwrap();
        let warning_at = section.find("nov24_inq_no").unwrap();
        assert!(error_at < warning_at);
    }

    #[test]
    fn test_generate_agent_markdown() {
        let dataset = sample_dataset();
        let record = agent(&dataset, "Thomas");
        let report = AgentReport::build("Thomas", &dataset, record);
        let markdown = generate_agent_markdown(&report);

        assert!(!markdown.contains("(partial)"));
        assert!(markdown.contains("Welcome, Thomas!"));
        assert!(markdown.contains("**Total Revenue Generated:** $1,500.00"));
        assert!(markdown.contains("**Total Target Achieved:** $6,000.00"));
        assert!(markdown.contains("**Performance Rating:** High Roller"));
        assert!(markdown.contains("**Customer Inquiries:** 15"));
        assert!(markdown.contains("September"));
    }

    #[test]
    fn test_bar_chart_scales_to_peak() {
        let dataset = sample_dataset();
        let record = agent(&dataset, "Thomas");
        let chart = render_bar_chart(&dataset.periods, record, &[]);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 6);
        // September target (2000) is the peak and gets the full width.
        assert_eq!(lines[1].matches('█').count(), CHART_WIDTH);
        // September revenue (1000) gets half.
        assert_eq!(lines[0].matches('█').count(), CHART_WIDTH / 2);
        // November revenue is zero: no bar.
        assert_eq!(lines[4].matches('█').count(), 0);
    }

    #[test]
    fn test_bar_chart_all_zero() {
        let record = SalesRecord::zeroed("Eric", 1);
        let chart = render_bar_chart(&[Period::new("dec24", "December")], &record, &[]);
        assert!(!chart.contains('█'));
        assert!(chart.contains("$0"));
    }

    #[test]
    fn test_agent_markdown_marks_unusable_columns() {
        let mut dataset = sample_dataset();
        dataset.unusable_columns.insert("oct24_rev_gen".to_string());
        let record = agent(&dataset, "Thomas");
        let report = AgentReport::build("Thomas", &dataset, record);
        let markdown = generate_agent_markdown(&report);

        assert!(markdown.contains("**Total Revenue Generated:** $1,500.00 (partial)"));
        assert!(markdown.contains("**Performance Rating:** High Roller (partial)"));
        assert!(markdown.contains("**Customer Inquiries:** 15\n"));
        assert!(markdown.contains("leave out unusable columns: oct24_rev_gen"));
    }

    #[test]
    fn test_bar_chart_shows_unusable_cells_as_na() {
        let dataset = sample_dataset();
        let record = agent(&dataset, "Thomas");
        let unusable = vec!["oct24_rev_gen".to_string()];
        let chart = render_bar_chart(&dataset.periods, record, &unusable);
        let lines: Vec<&str> = chart.lines().collect();

        // October revenue: no bar, no figure.
        assert_eq!(lines[2].matches('█').count(), 0);
        assert!(lines[2].ends_with(" n/a"));
        assert!(!lines[2].contains("$500"));
        // October target is still drawn.
        assert_eq!(lines[3].matches('█').count(), CHART_WIDTH);
    }

    #[test]
    fn test_agent_markdown_without_data() {
        let periods = sample_dataset().periods;
        let report = AgentReport::unavailable("Thomas", &periods, "HTTP 500".to_string());
        let markdown = generate_agent_markdown(&report);

        assert!(markdown.contains("Welcome, Thomas!"));
        assert!(markdown.contains("Error fetching data: HTTP 500"));
        assert!(markdown.contains("No data available to display."));
        assert!(!markdown.contains("User Report"));

        let json = generate_json_report(&report).unwrap();
        assert!(json.contains("\"fetch_error\": \"HTTP 500\""));
        assert!(!json.contains("\"summary\""));
    }

    #[test]
    fn test_admin_markdown_marks_partial_totals() {
        let mut dataset = sample_dataset();
        dataset.unusable_columns.insert("nov24_target".to_string());
        let report = AdminReport::build("Admin", &dataset, None);
        let markdown = generate_admin_markdown(&report);

        assert!(markdown.contains("| n/a |"));
        assert!(markdown.contains("Star Performer (partial)"));
        assert!(markdown.contains("leave out unusable columns: nov24_target"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = AdminReport::build("Admin", &sample_dataset(), None);
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"rows\""));
        assert!(json.contains("\"agent_name\": \"Thomas\""));
        assert!(json.contains("\"rating\": \"StarPerformer\""));
        assert!(!json.contains("fetch_error"));
    }
}
