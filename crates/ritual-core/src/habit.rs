//! Habit model and lifecycle types.
//!
//! Habits are soft-deleted only: `delete` flips the status to
//! `Deleted` and the row (with its check-in history) stays in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitStatus {
    Active,
    Paused,
    Deleted,
}

impl HabitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HabitStatus::Active => "active",
            HabitStatus::Paused => "paused",
            HabitStatus::Deleted => "deleted",
        }
    }

    /// Parse from database string, falling back to `Active`.
    pub fn parse(status_str: &str) -> Self {
        match status_str {
            "paused" => HabitStatus::Paused,
            "deleted" => HabitStatus::Deleted,
            _ => HabitStatus::Active,
        }
    }
}

/// How often the habit is meant to be performed.
///
/// Completion-rate denominators currently assume a daily cadence for
/// every habit regardless of this setting; the enum is kept on the
/// model so the divisor can be made frequency-aware later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

impl HabitFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            HabitFrequency::Daily => "daily",
            HabitFrequency::Weekly => "weekly",
            HabitFrequency::Custom => "custom",
        }
    }

    /// Parse from database string, falling back to `Daily`.
    pub fn parse(freq_str: &str) -> Self {
        match freq_str {
            "weekly" => HabitFrequency::Weekly,
            "custom" => HabitFrequency::Custom,
            _ => HabitFrequency::Daily,
        }
    }
}

/// A habit owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub frequency: HabitFrequency,
    /// Reminder time of day as "HH:MM", surfaced to clients verbatim.
    pub reminder_time: Option<String>,
    pub status: HabitStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a habit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub frequency: HabitFrequency,
    #[serde(default)]
    pub reminder_time: Option<String>,
}

/// Partial habit update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<HabitFrequency>,
    pub reminder_time: Option<String>,
    pub status: Option<HabitStatus>,
}

impl Habit {
    /// Apply a partial update in place.
    pub(crate) fn apply(&mut self, update: HabitUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(icon) = update.icon {
            self.icon = Some(icon);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        if let Some(reminder_time) = update.reminder_time {
            self.reminder_time = Some(reminder_time);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}
