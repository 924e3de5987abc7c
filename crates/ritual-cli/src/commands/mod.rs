//! CLI command implementations.

pub mod checkin;
pub mod config;
pub mod habit;
pub mod points;
pub mod stats;

use ritual_core::{Config, Tracker, User};

/// Open the engine with the configured timezone offset and resolve the
/// configured default user.
pub(crate) fn open() -> Result<(Tracker, User), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let tracker = Tracker::open_with(&config)?;
    let user = tracker.ensure_user(&config.default_user, None)?;
    Ok((tracker, user))
}
