//! Persistent storage: SQLite database, migrations, TOML config.

mod config;
pub mod database;
pub mod migrations;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/ritual[-dev]/` based on RITUAL_ENV, creating it
/// if needed.
///
/// RITUAL_DATA_DIR overrides the location entirely (used by tests and
/// scripted setups). Set RITUAL_ENV=dev to use a development data
/// directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    if let Ok(dir) = std::env::var("RITUAL_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RITUAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ritual-dev")
    } else {
        base_dir.join("ritual")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
