use clap::Subcommand;
use focushub_core::storage::data_dir;
use focushub_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.default_preset", "remote.mode")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    let dir = data_dir()?;
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_in(&dir)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_in(&dir)?;
            config.set(&key, &value)?;
            config.save_in(&dir)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load_in(&dir)?;
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save_in(&dir)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
