//! Clock abstraction for date-sensitive computations.
//!
//! Streak, window and bonus math all depend on "today". The engine
//! reads dates only through a [`Clock`] so tests can pin the date with
//! [`FixedClock`].

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Source of "today" and "now" for the engine.
pub trait Clock: Send + Sync {
    /// Current calendar date in the configured time zone.
    fn today(&self) -> NaiveDate;

    /// Current instant (always UTC).
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock with a fixed hour offset from UTC.
///
/// The offset shifts only the calendar-date boundary; timestamps are
/// stored in UTC regardless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset_hours: i32,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(offset_hours: i32) -> Self {
        Self { offset_hours }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        (Utc::now() + Duration::hours(i64::from(self.offset_hours))).date_naive()
    }
}

/// Clock pinned to a fixed date, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        // Midday keeps the timestamp inside the pinned date for any
        // reasonable offset.
        self.today
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
            .and_utc()
    }
}
