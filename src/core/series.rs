//! Gap-filling of sparse daily uptime history into a full retention window.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day of uptime history as produced by the health-check pipeline.
///
/// At most one per calendar day; days a monitor was never checked simply
/// have no aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_checks: i64,
    pub successful_checks: i64,
    pub uptime_percentage: f64,
}

/// One day of the rendered history bar: every day of the retention window
/// gets exactly one, monitored or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayDay {
    pub date: NaiveDate,
    pub is_monitored: bool,
    pub uptime_percentage: f64,
    pub total_checks: i64,
    pub successful_checks: i64,
}

/// Summary statistics over a densified window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesSummary {
    pub average_uptime: f64,
    pub total_checks: i64,
    pub monitored_days: usize,
}

/// Expand sparse aggregates into a dense window of exactly `retention_days`
/// entries ending at `today`, ascending.
///
/// Aggregates outside the window are ignored; days with no aggregate come
/// back unmonitored rather than as zero uptime. If the input violates the
/// at-most-one-per-day contract, the first match for a date wins.
pub fn densify(raw: &[DailyAggregate], retention_days: u32, today: NaiveDate) -> Vec<DisplayDay> {
    let start = today - Duration::days(retention_days as i64 - 1);

    let mut days = Vec::with_capacity(retention_days as usize);
    let mut date = start;
    while date <= today {
        match raw.iter().find(|a| a.date == date) {
            Some(agg) => days.push(DisplayDay {
                date,
                is_monitored: true,
                uptime_percentage: agg.uptime_percentage,
                total_checks: agg.total_checks,
                successful_checks: agg.successful_checks,
            }),
            None => days.push(DisplayDay {
                date,
                is_monitored: false,
                uptime_percentage: 0.0,
                total_checks: 0,
                successful_checks: 0,
            }),
        }
        date += Duration::days(1);
    }

    days
}

/// Summarize a densified window.
///
/// Average uptime counts monitored days only; an all-unmonitored window
/// reports exactly 0.0 so downstream display never sees NaN.
pub fn summarize(days: &[DisplayDay]) -> SeriesSummary {
    let monitored: Vec<&DisplayDay> = days.iter().filter(|d| d.is_monitored).collect();

    let average_uptime = if monitored.is_empty() {
        0.0
    } else {
        monitored.iter().map(|d| d.uptime_percentage).sum::<f64>() / monitored.len() as f64
    };

    SeriesSummary {
        average_uptime,
        total_checks: days.iter().map(|d| d.total_checks).sum(),
        monitored_days: monitored.len(),
    }
}
