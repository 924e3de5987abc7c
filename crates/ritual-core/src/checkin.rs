//! Check-in records and calendar views.
//!
//! A check-in is keyed by calendar date, not timestamp: at most one
//! row may exist per (habit, date), enforced by a SQL unique
//! constraint. Rows are immutable once created.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One attendance record for a habit on a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkin {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: i64,
    /// The semantic key: which day this check-in covers.
    pub checkin_date: NaiveDate,
    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
    pub note: Option<String>,
    /// Path or URL of an attached image, stored verbatim.
    pub image: Option<String>,
    /// True when the record was backdated through the makeup flow.
    pub is_makeup: bool,
}

/// Optional payload for a new check-in.
#[derive(Debug, Clone, Default)]
pub struct NewCheckin {
    pub note: Option<String>,
    pub image: Option<String>,
}

/// One day cell in a habit's month calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub checked_in: bool,
    pub is_makeup: bool,
    pub note: Option<String>,
    pub image: Option<String>,
}

/// Calendar view of one habit for one month.
///
/// `days` maps ISO dates to cells; days without a record are simply
/// absent. The map is ordered, so repeated reads serialize
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub habit_id: i64,
    pub year: i32,
    pub month: u32,
    pub days: BTreeMap<String, CalendarDay>,
}

/// Result of a successful check-in, regular or makeup.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinReceipt {
    pub checkin: Checkin,
    /// Current streak including the new record.
    pub streak: u32,
    /// Signed point delta applied by this operation: a positive award
    /// for regular check-ins, the negative makeup cost for makeups.
    pub points_delta: i64,
    /// Balance after the operation, bonuses included.
    pub balance: i64,
}
