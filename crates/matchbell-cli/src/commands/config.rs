use clap::Subcommand;
use matchbell_core::{AlertConfig, SettingsStore, TomlSettings};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "lead_secs", "priority_filter")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value (priority_filter takes a JSON array, e.g. "[3,5]")
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = TomlSettings::default_location()?;
    match action {
        ConfigAction::Get { key } => {
            let config = store.load()?.unwrap_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = store.load()?.unwrap_or_default();
            config.set(&key, &value)?;
            store.store(&config)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = store.load()?.unwrap_or_default();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.store(&AlertConfig::default())?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
