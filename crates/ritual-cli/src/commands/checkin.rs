//! Check-in commands: record, makeup, list, calendar.

use chrono::{Datelike, NaiveDate};
use clap::Subcommand;
use ritual_core::NewCheckin;

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Record a check-in for today
    Record {
        /// Habit ID
        habit_id: i64,
        /// Check-in date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Attached note
        #[arg(long)]
        note: Option<String>,
        /// Attached image path or URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Backdate a check-in to yesterday for 20 points
    Makeup {
        /// Habit ID
        habit_id: i64,
    },
    /// List check-ins, newest first
    List {
        /// Filter by habit ID
        #[arg(long)]
        habit_id: Option<i64>,
        /// Earliest date (inclusive)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Latest date (inclusive)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Month calendar for one habit
    Calendar {
        /// Habit ID
        habit_id: i64,
        /// Year (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current)
        #[arg(long)]
        month: Option<u32>,
    },
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, user) = super::open()?;

    match action {
        CheckinAction::Record {
            habit_id,
            date,
            note,
            image,
        } => {
            let date = date.unwrap_or_else(|| tracker.today());
            let receipt =
                tracker.record_checkin(user.id, habit_id, date, NewCheckin { note, image })?;
            println!("Checked in: habit {habit_id} on {date}");
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        CheckinAction::Makeup { habit_id } => {
            let yesterday = tracker
                .today()
                .pred_opt()
                .ok_or("no yesterday for this date")?;
            let receipt = tracker.record_makeup_checkin(user.id, habit_id, yesterday)?;
            println!("Makeup check-in: habit {habit_id} on {yesterday}");
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        CheckinAction::List {
            habit_id,
            start,
            end,
        } => {
            let checkins = tracker.list_checkins(user.id, habit_id, start, end)?;
            println!("{}", serde_json::to_string_pretty(&checkins)?);
        }
        CheckinAction::Calendar {
            habit_id,
            year,
            month,
        } => {
            let today = tracker.today();
            let calendar = tracker.month_calendar(
                user.id,
                habit_id,
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month()),
            )?;
            println!("{}", serde_json::to_string_pretty(&calendar)?);
        }
    }
    Ok(())
}
