use clap::Subcommand;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Account-wide overview
    Overview,
    /// Per-habit statistics
    Habits,
    /// Daily check-in counts for a trailing window
    Daily {
        /// Window length in days
        #[arg(long, default_value = "7")]
        days: u32,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, user) = super::open()?;

    match action {
        StatsAction::Overview => {
            let stats = tracker.overview(user.id)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Habits => {
            let stats = tracker.habit_statistics(user.id)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Daily { days } => {
            let stats = tracker.daily_statistics(user.id, days)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
