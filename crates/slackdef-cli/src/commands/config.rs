use crate::errors::CommandError;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use slackdef_config::{Config, ConfigError};
use slackdef_logger as logger;
use std::path::Path;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set a configuration value (output-path, pretty, default-definition)
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, future runs read the config from that file.
    /// If omitted, the CLI prints the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CommandError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            if !Config::is_known_key(&key) {
                return Err(ConfigError::UnknownKey(key).into());
            }
            let mut config = Config::load()?;
            config.set(&key, value.clone())?;
            config.save()?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path()?;
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match new_path {
                Some(p) => {
                    Config::set_path(Path::new(&p))?;
                    logger::success(&format!("Config path set to {}", p));
                }
                None => println!("{}", config_path.display()),
            }
        }
    }
    Ok(())
}
