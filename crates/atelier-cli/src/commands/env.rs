//! Env commands - manage the project .env file

use anyhow::Result;
use atelier_core::EnvFile;
use clap::Subcommand;
use colored::Colorize;
use std::path::Path;

#[derive(Subcommand)]
pub enum EnvCommand {
    /// List all entries (values masked)
    List,
    /// Set a key
    Set { key: String, value: String },
    /// Remove a key
    Unset { key: String },
}

pub fn run(root: &Path, command: EnvCommand) -> Result<()> {
    match command {
        EnvCommand::List => {
            let env = EnvFile::load(root)?;
            let entries = env.entries();
            if entries.is_empty() {
                println!("{}", "(empty)".dimmed());
            }
            for (key, value) in entries {
                println!("{}={}", key.cyan(), mask(&value).dimmed());
            }
        }
        EnvCommand::Set { key, value } => {
            let mut env = EnvFile::load(root)?;
            env.set(&key, &value);
            env.save()?;
            println!("{} {}", "set".green(), key);
        }
        EnvCommand::Unset { key } => {
            let mut env = EnvFile::load(root)?;
            if env.unset(&key) {
                env.save()?;
                println!("{} {}", "unset".green(), key);
            } else {
                println!("{} {} was not set", "note:".yellow(), key);
            }
        }
    }
    Ok(())
}

fn mask(value: &str) -> String {
    if value.len() > 8 {
        format!("{}****{}", &value[..2], &value[value.len() - 2..])
    } else {
        "****".to_string()
    }
}
