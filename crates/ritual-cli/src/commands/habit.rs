//! Habit management commands.

use clap::Subcommand;
use ritual_core::{HabitFrequency, HabitStatus, HabitUpdate, NewHabit};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Habit description
        #[arg(long)]
        description: Option<String>,
        /// Display icon
        #[arg(long)]
        icon: Option<String>,
        /// Category label
        #[arg(long)]
        category: Option<String>,
        /// Frequency: daily, weekly or custom (default: daily)
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Reminder time of day as HH:MM
        #[arg(long)]
        reminder_time: Option<String>,
    },
    /// List habits (active only by default)
    List {
        /// Include paused and deleted habits
        #[arg(long)]
        all: bool,
    },
    /// Show one habit with its streaks
    Show {
        /// Habit ID
        id: i64,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New icon
        #[arg(long)]
        icon: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New frequency: daily, weekly or custom
        #[arg(long)]
        frequency: Option<String>,
        /// New reminder time as HH:MM
        #[arg(long)]
        reminder_time: Option<String>,
    },
    /// Pause a habit
    Pause {
        /// Habit ID
        id: i64,
    },
    /// Resume a paused habit
    Resume {
        /// Habit ID
        id: i64,
    },
    /// Delete a habit (history is kept)
    Remove {
        /// Habit ID
        id: i64,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, user) = super::open()?;

    match action {
        HabitAction::Add {
            name,
            description,
            icon,
            category,
            frequency,
            reminder_time,
        } => {
            let habit = tracker.create_habit(
                user.id,
                NewHabit {
                    name,
                    description,
                    icon,
                    category,
                    frequency: HabitFrequency::parse(&frequency),
                    reminder_time,
                },
            )?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { all } => {
            let habits = if all {
                tracker.db().habits_for_user(user.id, None)?
            } else {
                tracker.habits(user.id)?
            };
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Show { id } => {
            let habit = tracker.habit(user.id, id)?;
            let current = tracker.current_streak(id)?;
            let longest = tracker.longest_streak(id)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
            println!("current streak: {current}");
            println!("longest streak: {longest}");
        }
        HabitAction::Update {
            id,
            name,
            description,
            icon,
            category,
            frequency,
            reminder_time,
        } => {
            let habit = tracker.update_habit(
                user.id,
                id,
                HabitUpdate {
                    name,
                    description,
                    icon,
                    category,
                    frequency: frequency.as_deref().map(HabitFrequency::parse),
                    reminder_time,
                    status: None,
                },
            )?;
            println!("Habit updated:");
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Pause { id } => {
            tracker.update_habit(
                user.id,
                id,
                HabitUpdate {
                    status: Some(HabitStatus::Paused),
                    ..Default::default()
                },
            )?;
            println!("Habit paused: {id}");
        }
        HabitAction::Resume { id } => {
            tracker.update_habit(
                user.id,
                id,
                HabitUpdate {
                    status: Some(HabitStatus::Active),
                    ..Default::default()
                },
            )?;
            println!("Habit resumed: {id}");
        }
        HabitAction::Remove { id } => {
            tracker.delete_habit(user.id, id)?;
            println!("Habit deleted: {id}");
        }
    }
    Ok(())
}
