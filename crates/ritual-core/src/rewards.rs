//! Fixed reward catalog for point exchange.
//!
//! The catalog is compiled in and not persisted; exchanges only touch
//! the point ledger.

use serde::Serialize;

/// A reward purchasable with points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reward {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: i64,
    pub category: &'static str,
    pub icon: &'static str,
}

/// All purchasable rewards.
pub const CATALOG: &[Reward] = &[
    Reward {
        id: "badge_bronze",
        name: "Bronze Badge",
        description: "A bronze achievement badge",
        cost: 100,
        category: "badge",
        icon: "🥉",
    },
    Reward {
        id: "badge_silver",
        name: "Silver Badge",
        description: "A silver achievement badge",
        cost: 250,
        category: "badge",
        icon: "🥈",
    },
    Reward {
        id: "badge_gold",
        name: "Gold Badge",
        description: "A gold achievement badge",
        cost: 500,
        category: "badge",
        icon: "🥇",
    },
    Reward {
        id: "theme_dark",
        name: "Dark Theme",
        description: "Unlock dark theme for the app",
        cost: 150,
        category: "theme",
        icon: "🌙",
    },
    Reward {
        id: "theme_nature",
        name: "Nature Theme",
        description: "Beautiful nature-themed interface",
        cost: 200,
        category: "theme",
        icon: "🌿",
    },
    Reward {
        id: "avatar_frame_gold",
        name: "Golden Avatar Frame",
        description: "Exclusive golden frame for your avatar",
        cost: 300,
        category: "avatar",
        icon: "👑",
    },
    Reward {
        id: "title_master",
        name: "Habit Master Title",
        description: "Special title for dedicated users",
        cost: 1000,
        category: "title",
        icon: "🏆",
    },
];

/// Look up a reward by id.
pub fn find(reward_id: &str) -> Option<&'static Reward> {
    CATALOG.iter().find(|r| r.id == reward_id)
}

/// Outcome of a successful exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeOutcome {
    pub reward: Reward,
    pub remaining_points: i64,
}
