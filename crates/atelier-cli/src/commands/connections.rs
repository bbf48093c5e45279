//! Connections command - validate configured database connections

use anyhow::{Context, Result};
use atelier_conn::{ConnectRecipe, ConnectionConfig};
use atelier_core::settings::{effective_settings, Settings};
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let (user, _) = Settings::load_from_root(root).context("no settings file found")?;
    let settings = effective_settings(root, &user);

    let configs = ConnectionConfig::from_settings(&settings)?;
    if configs.is_empty() {
        println!("{}", "(no connections configured)".dimmed());
        return Ok(());
    }

    let mut failed = false;
    for (name, config) in &configs {
        match ConnectRecipe::build(name, config) {
            Ok(recipe) => println!("{} {}", "ok".green(), recipe),
            Err(e) => {
                failed = true;
                println!("{} {}: {}", "invalid".red().bold(), name, e);
            }
        }
    }

    if failed {
        anyhow::bail!("one or more connections failed validation");
    }
    Ok(())
}
