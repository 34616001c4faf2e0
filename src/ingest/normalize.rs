//! Cell-level coercion of spreadsheet text into numbers.
//!
//! Both parsers return `None` only when a non-empty cell cannot be read;
//! absent or blank cells are zero.

/// Tokens the spreadsheet export uses for "no value".
const MISSING_TOKENS: &[&str] = &["nan", "na", "n/a", "#n/a", "null", "none", "-"];

/// Characters dropped from monetary cells before parsing.
const MONEY_NOISE: &[char] = &['$', '€', '£', ',', ' ', '\u{a0}'];

fn is_missing(cell: &str) -> bool {
    cell.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| cell.eq_ignore_ascii_case(token))
}

/// Parse a currency amount such as `$1,250.00`.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let cell = raw.map(str::trim).unwrap_or_default();
    if is_missing(cell) {
        return Some(0.0);
    }

    let cleaned: String = cell.chars().filter(|c| !MONEY_NOISE.contains(c)).collect();
    if cleaned.is_empty() {
        return Some(0.0);
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative count. Fractional values are truncated.
pub fn parse_count(raw: Option<&str>) -> Option<u32> {
    let cell = raw.map(str::trim).unwrap_or_default();
    if is_missing(cell) {
        return Some(0);
    }

    if let Ok(value) = cell.parse::<u32>() {
        return Some(value);
    }

    let value = cell.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value.trunc() as u32)
    } else {
        None
    }
}
