//! Point ledger and reward commands.

use clap::Subcommand;
use ritual_core::CATALOG;

#[derive(Subcommand)]
pub enum PointsAction {
    /// Balance and recent earn totals
    Summary,
    /// Ledger history, newest first
    History {
        /// Page size
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Page offset
        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// List the reward catalog
    Rewards,
    /// Exchange points for a reward
    Exchange {
        /// Reward ID (see `points rewards`)
        reward_id: String,
    },
}

pub fn run(action: PointsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, user) = super::open()?;

    match action {
        PointsAction::Summary => {
            let summary = tracker.point_summary(user.id)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        PointsAction::History { limit, offset } => {
            let records = tracker.point_history(user.id, limit, offset)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        PointsAction::Rewards => {
            println!("{}", serde_json::to_string_pretty(&CATALOG)?);
        }
        PointsAction::Exchange { reward_id } => {
            let outcome = tracker.exchange_reward(user.id, &reward_id)?;
            println!("Exchanged: {} ({} points)", outcome.reward.name, outcome.reward.cost);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
