//! Point ledger types and the award policy.
//!
//! The ledger is append-only; `users.points` is a materialized sum of
//! the deltas, updated in the same transaction as every append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base award for any regular check-in.
pub const CHECKIN_BASE_POINTS: i64 = 10;
/// Extra award when the post-checkin streak hits a multiple of 7.
pub const WEEKLY_STREAK_BONUS: i64 = 50;
/// Extra award when the post-checkin streak hits a multiple of 30.
pub const MONTHLY_STREAK_BONUS: i64 = 200;
/// One-shot award for a 100% month, on or after day 28.
pub const MONTHLY_COMPLETION_BONUS: i64 = 300;
/// Cost of backdating a check-in to yesterday.
pub const MAKEUP_COST: i64 = 20;
/// Earliest day of month on which the completion bonus can trigger.
pub const MONTHLY_BONUS_EARLIEST_DAY: u32 = 28;

/// Idempotency kind for the monthly completion bonus.
pub const MONTHLY_BONUS_KIND: &str = "monthly_completion";

/// Ledger reason tags.
pub const REASON_DAILY_CHECKIN: &str = "daily_checkin";
pub const REASON_MAKEUP_CHECKIN: &str = "makeup_checkin";
pub const REASON_MONTHLY_BONUS: &str = "monthly_completion_bonus";

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Earn,
    Spend,
}

impl PointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointKind::Earn => "earn",
            PointKind::Spend => "spend",
        }
    }

    /// Parse from database string, falling back to `Earn`.
    pub fn parse(kind_str: &str) -> Self {
        match kind_str {
            "spend" => PointKind::Spend,
            _ => PointKind::Earn,
        }
    }
}

/// Append-only ledger entry; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: i64,
    pub user_id: i64,
    /// Signed delta: positive for earns, negative for spends.
    pub points: i64,
    pub kind: PointKind,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Earn totals over the usual reporting windows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointSummary {
    pub total_points: i64,
    pub earned_today: i64,
    pub earned_this_week: i64,
    pub earned_this_month: i64,
}

/// Streak-dependent bonus for a post-checkin streak value.
///
/// The two multiples are evaluated independently: streak 7 earns +50,
/// streak 30 earns +200, streak 210 earns both.
pub fn streak_bonus(streak: u32) -> i64 {
    let mut bonus = 0;
    if streak > 0 && streak % 7 == 0 {
        bonus += WEEKLY_STREAK_BONUS;
    }
    if streak > 0 && streak % 30 == 0 {
        bonus += MONTHLY_STREAK_BONUS;
    }
    bonus
}
