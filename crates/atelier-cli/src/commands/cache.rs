//! Cache commands

use anyhow::Result;
use atelier_store::{short_hash, CacheStore, Database};
use clap::Subcommand;
use colored::Colorize;
use std::path::Path;

#[derive(Subcommand)]
pub enum CacheCommand {
    /// List cache entries
    List,
    /// Remove one entry
    Forget { name: String },
    /// Remove every entry
    Clear,
    /// Drop expired and corrupt entries
    Prune,
}

pub async fn run(root: &Path, command: CacheCommand) -> Result<()> {
    let db = Database::open(root).await?;
    let cache = CacheStore::new(db, root);

    match command {
        CacheCommand::List => {
            let entries = cache.list().await?;
            if entries.is_empty() {
                println!("{}", "(cache is empty)".dimmed());
            }
            for entry in entries {
                let expiry = match entry.expire_at {
                    Some(at) => format!("expires {}", at.format("%Y-%m-%d %H:%M")),
                    None => "no expiry".to_string(),
                };
                println!(
                    "{}  {}  {}",
                    entry.name.cyan(),
                    short_hash(&entry.content_hash).dimmed(),
                    expiry.dimmed()
                );
            }
        }
        CacheCommand::Forget { name } => {
            if cache.forget(&name).await? {
                println!("{} {}", "forgot".green(), name);
            } else {
                println!("{} {} not found", "note:".yellow(), name);
            }
        }
        CacheCommand::Clear => {
            let n = cache.flush().await?;
            println!("{} {} entries", "cleared".green(), n);
        }
        CacheCommand::Prune => {
            let n = cache.prune().await?;
            println!("{} {} stale entries", "pruned".green(), n);
        }
    }
    Ok(())
}
