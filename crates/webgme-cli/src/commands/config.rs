use crate::errors::ComponentError;
use crate::logger;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use webgme_config::settings::{SETTINGS_ENV_VAR, SETTINGS_KEYS};
use webgme_config::Settings;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the current settings
    Show,
    /// Set a setting (npm-path, node-path, install-timeout)
    Set { key: String, value: String },
    /// Print the path of the settings file
    Path,
}

pub fn handle_config(
    action: Option<ConfigAction>,
    opts: &GlobalOpts,
) -> Result<(), ComponentError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let settings = load()?;
            println!("{}", "Configuration:".bold().green());
            for line in describe(&settings, opts.verbosity_level() > 0) {
                println!("{}", line);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = load()?;
            settings
                .set(&key, value.clone())
                .map_err(ComponentError::InvalidArgs)?;
            settings
                .save()
                .map_err(|e| ComponentError::Settings(format!("Failed to save config: {}", e)))?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path => {
            let path = Settings::path();
            logger::debug(&format!("Reading config from: {}", path.display()));
            println!("{}", path.display());
            if std::env::var_os(SETTINGS_ENV_VAR).is_some() {
                println!("{} {}", "overridden-by".cyan(), SETTINGS_ENV_VAR);
            }
        }
    }
    Ok(())
}

fn load() -> Result<Settings, ComponentError> {
    Settings::load().map_err(|e| ComponentError::Settings(format!("Failed to load config: {}", e)))
}

/// Lines printed by `config show`
fn describe(settings: &Settings, verbose: bool) -> Vec<String> {
    if settings.is_empty() {
        return if verbose {
            vec![format!("  {}", "(empty)".yellow())]
        } else {
            Vec::new()
        };
    }

    let mut lines: Vec<String> = settings
        .values_iter()
        .into_iter()
        .map(|(key, value)| format!("  {}: {}", key.cyan(), value))
        .collect();
    if verbose {
        let unset: Vec<&str> = SETTINGS_KEYS
            .iter()
            .copied()
            .filter(|key| settings.get(key).is_none())
            .collect();
        if !unset.is_empty() {
            lines.push(format!("  {} {}", "unset:".dimmed(), unset.join(", ")));
        }
    }
    lines
}
