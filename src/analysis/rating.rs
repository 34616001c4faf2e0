//! Revenue-vs-target rating.
//!
//! The thresholds below are compared against the attainment percentage
//! `revenue / target * 100`. Negative targets are not guarded; the formula
//! is applied as-is.

use crate::models::Rating;

/// At or below this percentage (or with zero revenue) the rating is Critical.
pub const CRITICAL_PCT: f64 = -60.0;
pub const EXTREMELY_POOR_PCT: f64 = -40.0;
pub const POOR_PCT: f64 = -20.0;

pub const HIGH_ROLLER_MAX_PCT: f64 = 25.0;
pub const SALES_HERO_MAX_PCT: f64 = 75.0;
pub const TOP_ACHIEVER_MAX_PCT: f64 = 150.0;

/// Revenue as a percentage of target, or `None` when the target is zero.
pub fn attainment_percentage(total_revenue: f64, total_target: f64) -> Option<f64> {
    if total_target == 0.0 {
        None
    } else {
        Some((total_revenue / total_target) * 100.0)
    }
}

/// Map an agent's totals to a rating. Every input pair yields exactly one label.
pub fn rate(total_revenue: f64, total_target: f64) -> Rating {
    let Some(pct) = attainment_percentage(total_revenue, total_target) else {
        return if total_revenue == 0.0 {
            Rating::NoTargetOrSalesData
        } else {
            Rating::TargetZeroUndefined
        };
    };

    if pct < 0.0 || total_revenue == 0.0 {
        if total_revenue == 0.0 || pct <= CRITICAL_PCT {
            Rating::Critical
        } else if pct <= EXTREMELY_POOR_PCT {
            Rating::ExtremelyPoor
        } else if pct <= POOR_PCT {
            Rating::Poor
        } else {
            Rating::Deficient
        }
    } else if pct <= HIGH_ROLLER_MAX_PCT {
        Rating::HighRoller
    } else if pct <= SALES_HERO_MAX_PCT {
        Rating::SalesHero
    } else if pct <= TOP_ACHIEVER_MAX_PCT {
        Rating::TopAchiever
    } else {
        Rating::StarPerformer
    }
}
