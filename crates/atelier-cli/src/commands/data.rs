//! Data registry commands

use anyhow::Result;
use atelier_store::{short_hash, Database, DataRegistry, Verification};
use clap::Subcommand;
use colored::Colorize;
use std::path::Path;

#[derive(Subcommand)]
pub enum DataCommand {
    /// Register a data file, recording its content hash
    Register {
        name: String,
        path: String,
        /// Where the data came from
        #[arg(long, default_value = "")]
        origin: String,
    },
    /// Re-hash a registered file and report drift
    Verify { name: String },
    /// List registered data files
    List,
}

pub async fn run(root: &Path, command: DataCommand) -> Result<()> {
    let db = Database::open(root).await?;
    let registry = DataRegistry::new(db, root);

    match command {
        DataCommand::Register { name, path, origin } => {
            let record = registry.register(&name, &path, &origin).await?;
            println!(
                "{} {} ({})",
                "registered".green(),
                record.name,
                short_hash(&record.content_hash)
            );
        }
        DataCommand::Verify { name } => match registry.verify(&name).await? {
            Some(Verification::Intact) => println!("{} {}", "intact".green(), name),
            Some(Verification::Drifted { recorded, actual }) => {
                println!("{} {}", "DRIFTED".red().bold(), name);
                println!("  recorded: {}", short_hash(&recorded));
                println!("  actual:   {}", short_hash(&actual));
            }
            Some(Verification::Missing) => println!("{} {} file is gone", "MISSING".red(), name),
            None => println!("{} {} is not registered", "note:".yellow(), name),
        },
        DataCommand::List => {
            let entries = registry.list().await?;
            if entries.is_empty() {
                println!("{}", "(no data registered)".dimmed());
            }
            for entry in entries {
                println!(
                    "{}  {}  {}",
                    entry.name.cyan(),
                    entry.path,
                    entry.origin.dimmed()
                );
            }
        }
    }
    Ok(())
}
