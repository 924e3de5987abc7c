//! Expectation-based completion rates over date windows.
//!
//! The target is one check-in per active habit per day; a habit's own
//! frequency setting does not change the divisor (preserved behavior,
//! see DESIGN.md).

use chrono::{Datelike, Duration, NaiveDate};

/// Actual over expected as a percentage in [0, 100].
///
/// Zero expectation yields 0 rather than a division error.
pub fn rate(completed: u64, expected: u64) -> f64 {
    if expected == 0 {
        return 0.0;
    }
    completed as f64 / expected as f64 * 100.0
}

/// Inclusive window covering the trailing `window_days` days ending at
/// `today`. Days before the habit existed still count as missed.
pub fn trailing_window(today: NaiveDate, window_days: u32) -> (NaiveDate, NaiveDate) {
    let start = today - Duration::days(i64::from(window_days.saturating_sub(1)));
    (start, today)
}

/// First of the current month through `today`, plus the number of
/// elapsed days (the day-of-month).
pub fn month_window(today: NaiveDate) -> (NaiveDate, u32) {
    let first = today.with_day(1).unwrap_or(today);
    (first, today.day())
}

/// Most recent Monday through `today`, plus the number of elapsed
/// days (Monday itself counts as 1).
pub fn week_window(today: NaiveDate) -> (NaiveDate, u32) {
    let days_from_monday = today.weekday().num_days_from_monday();
    let monday = today - Duration::days(i64::from(days_from_monday));
    (monday, days_from_monday + 1)
}

/// Year-month idempotency key for monthly bonuses ("YYYY-MM").
pub fn year_month(today: NaiveDate) -> String {
    today.format("%Y-%m").to_string()
}
