//! Status command - summarize project state

use anyhow::Result;
use atelier_core::{needs_migration, Settings};
use atelier_store::{CacheStore, Database, DataRegistry, ProjectKey, ResultStore};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

pub async fn run(root: &Path, quiet: bool) -> Result<()> {
    let settings = Settings::load_from_root(root).ok();

    if quiet {
        // hook mode: only the exit code matters
        return Ok(());
    }

    println!("{}", format!("Project: {}", root.display()).cyan().bold());

    match &settings {
        Some((settings, path)) => {
            println!("Settings: {}", path.display());
            match settings.version() {
                Some(v) => println!("  version: {}", v),
                None => println!("  version: {}", "none".yellow()),
            }
            if needs_migration(settings.doc()) {
                println!(
                    "  {}",
                    "needs migration - run `atelier settings migrate`".yellow()
                );
            }
            let ai = settings.ai();
            if ai.enabled {
                println!(
                    "  ai: {} ({} synced files)",
                    ai.assistant.as_deref().unwrap_or("unspecified"),
                    ai.sync_files.len()
                );
            }
        }
        None => println!("Settings: {}", "not found".yellow()),
    }

    let db = Database::open(root).await?;
    let key = Arc::new(ProjectKey::load_or_create(root)?);
    let cache = CacheStore::new(db.clone(), root);
    let results = ResultStore::new(db.clone(), root, key);
    let data = DataRegistry::new(db, root);

    println!();
    println!("Store:");
    println!("  cache entries:   {}", cache.list().await?.len());
    println!("  results:         {}", results.list(None).await?.len());
    println!("  data registered: {}", data.list().await?.len());

    Ok(())
}
