//! Settings commands - show and migrate

use anyhow::{Context, Result};
use atelier_core::settings::{effective_settings, migrate, Settings};
use clap::Subcommand;
use colored::Colorize;
use std::path::Path;

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the effective (merged, resolved) settings
    Show,
    /// Migrate the settings file to the current version
    Migrate,
}

pub async fn run(root: &Path, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => show(root),
        SettingsCommand::Migrate => run_migrate(root),
    }
}

fn show(root: &Path) -> Result<()> {
    let user = match Settings::load_from_root(root) {
        Ok((settings, _)) => settings,
        Err(atelier_core::AtelierError::SettingsNotFound(_)) => {
            Settings::from_value(serde_yaml::Value::Mapping(Default::default()))
        }
        Err(e) => return Err(e).context("failed to load settings"),
    };

    let effective = effective_settings(root, &user);
    print!("{}", serde_yaml::to_string(effective.doc())?);
    Ok(())
}

fn run_migrate(root: &Path) -> Result<()> {
    let (mut settings, path) =
        Settings::load_from_root(root).context("no settings file to migrate")?;

    if migrate(settings.doc_mut()) {
        settings.save(&path)?;
        println!(
            "{}",
            format!("Migrated {} to version 2", path.display()).green()
        );
    } else {
        println!("{}", "Settings are already up to date".dimmed());
    }
    Ok(())
}
