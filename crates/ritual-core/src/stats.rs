//! Read-only statistics reports assembled from the ledgers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Account-wide statistics overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_habits: u64,
    pub active_habits: u64,
    pub total_checkins: u64,
    /// Max current streak over all active habits.
    pub current_longest_streak: u32,
    pub total_points: i64,
    pub monthly_completion_rate: f64,
    pub weekly_completion_rate: f64,
}

/// Per-habit statistics (active habits only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitStats {
    pub habit_id: i64,
    pub habit_name: String,
    pub total_checkins: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Trailing 30-day completion rate.
    pub completion_rate: f64,
    pub last_checkin_date: Option<NaiveDate>,
}

/// One day in a trailing daily breakdown; days without check-ins are
/// zero-filled here, unlike the month calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_checkins: u64,
    pub total_habits: u64,
    pub completion_rate: f64,
}
