use colored::Colorize;

use crate::error::Result;
use crate::settings::{save_settings, settings_path, Settings};

/// Persist `settings` after checking they resolve to a usable configuration.
pub fn run(settings: &Settings) -> Result<()> {
    settings.to_config()?;
    save_settings(settings)?;
    println!("{}", format!("Saved {}", settings_path().display()).green());
    println!("Dockets: {}", settings.dockets_path);
    println!("Parties: {}", settings.parties_path);
    Ok(())
}
