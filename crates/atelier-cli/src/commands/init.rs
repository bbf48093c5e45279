//! Init command - scaffold a new analysis project

use anyhow::Result;
use atelier_core::{scaffold, Settings};
use atelier_store::Database;
use colored::Colorize;
use std::path::Path;

pub async fn run(root: &Path, name: &str) -> Result<()> {
    let project_dir = if name == "." {
        root.to_path_buf()
    } else {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir)?;
        dir
    };

    println!(
        "{}",
        format!("Initializing project in {}", project_dir.display())
            .cyan()
            .bold()
    );

    let report = scaffold(&project_dir, &Settings::skeleton())?;

    // Creating the database up front makes the first cache/result call cheap
    // and surfaces permission problems immediately.
    Database::open(&project_dir).await?;

    println!("{}", "Project initialized".green().bold());
    println!();
    println!("Created directories:");
    for dir in &report.created_dirs {
        println!("  {}", dir.display().to_string().cyan());
    }
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to configure the project", "settings.yml".cyan());
    println!("  2. Run {} to install the pre-commit hook", "atelier hooks install".cyan());
    println!("  3. Run {} to open the settings GUI", "atelier serve".cyan());

    Ok(())
}
