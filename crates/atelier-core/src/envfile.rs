//! `.env` file management.
//!
//! Reads and writes `KEY=VALUE` pairs in a project's `.env` file while
//! preserving unrelated lines, comments, and ordering. Writing warns when
//! the file is not covered by `.gitignore` and adds the entry.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A project `.env` file
#[derive(Debug)]
pub struct EnvFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl EnvFile {
    /// Load the `.env` file of a project root (an absent file is an empty
    /// document).
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(".env");
        let lines = if path.exists() {
            std::fs::read_to_string(&path)?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        Ok(Self { path, lines })
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<String> {
        self.lines.iter().find_map(|line| parse_pair(line, key))
    }

    /// All key=value pairs, in file order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.lines
            .iter()
            .filter_map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return None;
                }
                let (k, v) = trimmed.split_once('=')?;
                Some((k.trim().to_string(), v.trim().to_string()))
            })
            .collect()
    }

    /// Set a key, replacing an existing assignment in place or appending
    pub fn set(&mut self, key: &str, value: &str) {
        let assignment = format!("{}={}", key, value);
        for line in &mut self.lines {
            if parse_pair(line, key).is_some() {
                *line = assignment;
                return;
            }
        }
        self.lines.push(assignment);
    }

    /// Remove a key. Returns true if an assignment was removed.
    pub fn unset(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| parse_pair(line, key).is_none());
        self.lines.len() != before
    }

    /// Write the file back, checking gitignore coverage first.
    pub fn save(&self) -> Result<()> {
        let root = self.path.parent().unwrap_or(Path::new("."));
        ensure_gitignored(root)?;

        let mut content = self.lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

fn parse_pair(line: &str, key: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return None;
    }
    let (k, v) = trimmed.split_once('=')?;
    if k.trim() == key {
        Some(v.trim().to_string())
    } else {
        None
    }
}

/// Check that `.env` is gitignored; warn and append the entry if not.
fn ensure_gitignored(root: &Path) -> Result<()> {
    let gitignore = root.join(".gitignore");
    let content = if gitignore.exists() {
        std::fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };

    let covered = content.lines().any(|l| {
        let l = l.trim();
        l == ".env" || l == "/.env" || l == "*.env"
    });
    if !covered {
        warn!(".env is not gitignored, adding it to {}", gitignore.display());
        let mut updated = content;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(".env\n");
        std::fs::write(&gitignore, updated)?;
    }
    Ok(())
}
