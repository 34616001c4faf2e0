//! CSV export of the admin summary.

use crate::models::Rating;
use crate::report::{is_usable, AdminReport, PARTIAL_MARK};
use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use tracing::info;

/// File name offered for the export when none is given.
pub const EXPORT_FILE_NAME: &str = "performance_summary.csv";

pub(crate) const UNUSABLE_CELL: &str = "n/a";

/// Amounts at or above this are printed without digit grouping.
const MAX_GROUPED_AMOUNT: f64 = 1e15;

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

fn sign_of(value: f64) -> &'static str {
    if value < 0.0 {
        "-"
    } else {
        ""
    }
}

/// Format an amount as `$1,234.56`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() || value.abs() >= MAX_GROUPED_AMOUNT {
        return format!("{}${:.2}", sign_of(value), value.abs());
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Format an amount rounded to whole units, as `$1,235`.
pub fn format_currency_whole(value: f64) -> String {
    if !value.is_finite() || value.abs() >= MAX_GROUPED_AMOUNT {
        return format!("{}${:.0}", sign_of(value), value.abs());
    }

    let whole = value.abs().round() as u64;
    let sign = if value < 0.0 && whole > 0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(whole))
}

/// Header row of the export.
fn export_headers(report: &AdminReport) -> Vec<String> {
    let mut headers = vec!["Agent Name".to_string()];
    headers.extend(report.periods.iter().map(|p| format!("{} Revenue", p.label)));
    headers.extend(report.periods.iter().map(|p| format!("{} Target", p.label)));
    headers.extend(["Total Revenue", "Total Target", "Rating"].map(String::from));
    headers
}

/// Render the admin summary as CSV text.
pub fn export_csv(report: &AdminReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(export_headers(report))?;

    for row in &report.rows {
        let mut fields = vec![row.summary.agent_name.clone()];

        let unusable = &report.unusable_columns;
        for (slot, period) in report.periods.iter().enumerate() {
            fields.push(money_cell(unusable, &period.revenue_column(), row.record.revenue[slot]));
        }
        for (slot, period) in report.periods.iter().enumerate() {
            fields.push(money_cell(unusable, &period.target_column(), row.record.target[slot]));
        }

        let mark = partial_mark(report.totals_partial);
        fields.push(format!("{}{}", format_currency(row.summary.total_revenue), mark));
        fields.push(format!("{}{}", format_currency(row.summary.total_target), mark));
        fields.push(format!("{}{}", row.summary.rating, mark));
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV export: {}", e))?;
    String::from_utf8(bytes).context("CSV export is not valid UTF-8")
}

pub(crate) fn partial_mark(partial: bool) -> &'static str {
    if partial {
        PARTIAL_MARK
    } else {
        ""
    }
}

pub(crate) fn money_cell(unusable_columns: &[String], column: &str, value: f64) -> String {
    if is_usable(unusable_columns, column) {
        format_currency(value)
    } else {
        UNUSABLE_CELL.to_string()
    }
}

/// Write the CSV export to `path`.
///
/// The export is parsed back before writing; a mismatch in agents or
/// ratings aborts the write.
pub fn write_export(report: &AdminReport, path: &Path) -> Result<()> {
    let content = export_csv(report)?;

    let parsed = parse_export(&content)?;
    let consistent = parsed.len() == report.rows.len()
        && parsed
            .iter()
            .zip(&report.rows)
            .all(|(p, r)| {
                p.agent_name == r.summary.agent_name
                    && p.rating == r.summary.rating
                    && p.partial == report.totals_partial
            });
    if !consistent {
        bail!("CSV export does not match the in-memory summary");
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    info!("Exported {} agents to {}", report.rows.len(), path.display());
    Ok(())
}

/// Agent name and rating read back from an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedRow {
    pub agent_name: String,
    pub rating: Rating,
    /// The rating was computed over an unusable column.
    pub partial: bool,
}

/// Parse an export produced by [`export_csv`].
pub fn parse_export(text: &str) -> Result<Vec<ExportedRow>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Export is missing the '{}' column", name))
    };
    let agent_index = column("Agent Name")?;
    let rating_index = column("Rating")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let agent_name = record.get(agent_index).unwrap_or_default().to_string();
        let cell = record.get(rating_index).unwrap_or_default();
        let (label, partial) = match cell.strip_suffix(PARTIAL_MARK) {
            Some(label) => (label, true),
            None => (cell, false),
        };
        let rating = label
            .parse::<Rating>()
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Bad rating for agent {}", agent_name))?;

        rows.push(ExportedRow {
            agent_name,
            rating,
            partial,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::sample_dataset;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(-700.0), "-$700.00");
    }

    #[test]
    fn test_format_currency_huge_amounts_do_not_saturate() {
        assert_eq!(format_currency(1e20), "$100000000000000000000.00");
        assert_eq!(format_currency(-1e20), "-$100000000000000000000.00");
        assert_eq!(format_currency_whole(1e20), "$100000000000000000000");
        assert_eq!(format_currency(999_999_999_999.5), "$999,999,999,999.50");
    }

    #[test]
    fn test_format_currency_whole() {
        assert_eq!(format_currency_whole(2500.4), "$2,500");
        assert_eq!(format_currency_whole(12.0), "$12");
    }

    #[test]
    fn test_export_headers() {
        let report = AdminReport::build("Admin", &sample_dataset(), None);
        let csv = export_csv(&report).unwrap();
        let header = csv.lines().next().unwrap();

        assert_eq!(
            header,
            "Agent Name,September Revenue,October Revenue,November Revenue,\
             September Target,October Target,November Target,\
             Total Revenue,Total Target,Rating"
        );
    }

    #[test]
    fn test_export_round_trip_keeps_agents_and_ratings() {
        let report = AdminReport::build("Admin", &sample_dataset(), None);
        let csv = export_csv(&report).unwrap();
        let parsed = parse_export(&csv).unwrap();

        let expected: Vec<ExportedRow> = report
            .rows
            .iter()
            .map(|r| ExportedRow {
                agent_name: r.summary.agent_name.clone(),
                rating: r.summary.rating,
                partial: false,
            })
            .collect();
        assert_eq!(parsed, expected);
        assert!(parsed.iter().any(|r| r.agent_name == "Max, Jr."));
    }

    #[test]
    fn test_unusable_columns_export_as_na() {
        let mut dataset = sample_dataset();
        dataset.unusable_columns.insert("oct24_rev_gen".to_string());
        let report = AdminReport::build("Admin", &dataset, None);
        let csv = export_csv(&report).unwrap();

        let first_row = csv.lines().nth(1).unwrap();
        assert!(first_row.starts_with("Thomas,\"$1,000.00\",n/a,$0.00,"));
        assert!(first_row.ends_with(",High Roller (partial)"));

        let parsed = parse_export(&csv).unwrap();
        assert_eq!(parsed[0].rating, Rating::HighRoller);
        assert!(parsed.iter().all(|r| r.partial));
    }

    #[test]
    fn test_write_export_with_partial_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        let mut dataset = sample_dataset();
        dataset.unusable_columns.insert("sept24_target".to_string());
        let report = AdminReport::build("Admin", &dataset, None);

        write_export(&report, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("(partial)"));
    }

    #[test]
    fn test_parse_export_rejects_unknown_rating() {
        let csv = "Agent Name,Rating\nJune,Legendary\n";
        assert!(parse_export(csv).is_err());
    }

    #[test]
    fn test_write_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        let report = AdminReport::build("Admin", &sample_dataset(), None);

        write_export(&report, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_export(&written).unwrap().len(), 3);
    }
}
