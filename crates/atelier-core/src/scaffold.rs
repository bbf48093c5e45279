//! Project scaffolding - standardized directory trees for analysis projects.

use crate::error::Result;
use crate::settings::model::{Settings, SKELETON_YAML};
use std::path::{Path, PathBuf};

/// Gitignore entries seeded into every scaffolded project
const GITIGNORE_ENTRIES: &[&str] = &[".env", ".atelier/", "results/private/"];

/// Files and directories created by [`scaffold`]
#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub created_dirs: Vec<PathBuf>,
    pub created_files: Vec<PathBuf>,
}

/// Create the standardized project tree under `root`.
///
/// Directories come from the settings `directories` section (skeleton
/// defaults when absent); each gets a `.gitkeep`. A skeleton `settings.yml`
/// is written if no settings file exists yet, and `.gitignore` is seeded
/// with entries for the env file, metadata store, and private results.
/// Existing files are never overwritten.
pub fn scaffold(root: &Path, settings: &Settings) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();
    std::fs::create_dir_all(root)?;

    for (_, rel_path) in settings.directories() {
        let dir = root.join(&rel_path);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            report.created_dirs.push(dir.clone());
        }
        let gitkeep = dir.join(".gitkeep");
        if !gitkeep.exists() {
            std::fs::write(&gitkeep, "")?;
            report.created_files.push(gitkeep);
        }
    }

    if Settings::find_file(root).is_none() {
        let settings_path = root.join("settings.yml");
        std::fs::write(&settings_path, SKELETON_YAML)?;
        report.created_files.push(settings_path);
    }

    seed_gitignore(root, &mut report)?;

    Ok(report)
}

fn seed_gitignore(root: &Path, report: &mut ScaffoldReport) -> Result<()> {
    let path = root.join(".gitignore");
    let existing = if path.exists() {
        std::fs::read_to_string(&path)?
    } else {
        String::new()
    };

    let mut lines: Vec<&str> = existing.lines().collect();
    let mut changed = false;
    for &entry in GITIGNORE_ENTRIES {
        if !lines.contains(&entry) {
            lines.push(entry);
            changed = true;
        }
    }

    if changed {
        std::fs::write(&path, format!("{}\n", lines.join("\n")))?;
        if existing.is_empty() {
            report.created_files.push(path);
        }
    }
    Ok(())
}
