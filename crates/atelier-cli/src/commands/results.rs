//! Results commands

use anyhow::Result;
use atelier_store::{Database, ProjectKey, ResultStore};
use clap::Subcommand;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum ResultsCommand {
    /// List results
    List {
        /// Only public results
        #[arg(long, conflicts_with = "private")]
        public: bool,
        /// Only private results
        #[arg(long)]
        private: bool,
    },
    /// Remove a result and its blob
    Remove { name: String },
}

pub async fn run(root: &Path, command: ResultsCommand) -> Result<()> {
    let db = Database::open(root).await?;
    let key = Arc::new(ProjectKey::load_or_create(root)?);
    let results = ResultStore::new(db, root, key);

    match command {
        ResultsCommand::List { public, private } => {
            let filter = match (public, private) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let entries = results.list(filter).await?;
            if entries.is_empty() {
                println!("{}", "(no results)".dimmed());
            }
            for entry in entries {
                let visibility = if entry.public { "public " } else { "private" };
                let blind = if entry.blind { " [blind]" } else { "" };
                println!(
                    "{}  {}  {}{}  {}",
                    entry.name.cyan(),
                    visibility,
                    entry.kind,
                    blind.yellow(),
                    entry.comment.unwrap_or_default().dimmed()
                );
            }
        }
        ResultsCommand::Remove { name } => {
            if results.remove(&name).await? {
                println!("{} {}", "removed".green(), name);
            } else {
                println!("{} {} not found", "note:".yellow(), name);
            }
        }
    }
    Ok(())
}
