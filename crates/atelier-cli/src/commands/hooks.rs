//! Hooks commands - git pre-commit hook management

use anyhow::{Context, Result};
use atelier_core::{install_hook, render_hook, Settings};
use clap::Subcommand;
use colored::Colorize;
use std::path::Path;

#[derive(Subcommand)]
pub enum HooksCommand {
    /// Install the pre-commit hook from the current settings
    Install,
    /// Print the hook script without installing it
    Show,
}

pub fn run(root: &Path, command: HooksCommand) -> Result<()> {
    let git = match Settings::load_from_root(root) {
        Ok((settings, _)) => settings.git(),
        Err(_) => Settings::skeleton().git(),
    };

    match command {
        HooksCommand::Install => {
            let path = install_hook(root, &git).context("failed to install pre-commit hook")?;
            println!("{} {}", "installed".green(), path.display());
        }
        HooksCommand::Show => {
            print!("{}", render_hook(&git));
        }
    }
    Ok(())
}
