use clap::Subcommand;
use ritual_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set the default user identity
    SetUser {
        /// Identity key resolved to a local user
        openid: String,
    },
    /// Set the timezone offset for the calendar-day boundary
    SetOffset {
        /// Hour offset from UTC
        hours: i32,
    },
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::SetUser { openid } => {
            let mut config = Config::load()?;
            config.default_user = openid;
            config.save()?;
            println!("ok");
        }
        ConfigAction::SetOffset { hours } => {
            let mut config = Config::load()?;
            config.timezone_offset_hours = hours;
            config.save()?;
            println!("ok");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
