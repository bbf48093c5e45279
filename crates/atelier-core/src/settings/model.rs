//! Settings document model.
//!
//! A settings document is a nested YAML tree with well-known sections
//! (`meta`, `defaults`, `directories`, `connections`, `data`, `ai`, `git`).
//! Unknown keys are preserved: the document is held as a raw
//! [`serde_yaml::Value`] and typed views are deserialized per section on
//! demand.

use crate::error::{AtelierError, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Settings file names to search for at the project root
pub const SETTINGS_FILE_NAMES: &[&str] = &["settings.yml", "settings.yaml", "config.yml"];

/// The shipped default settings tree ("skeleton"), used as the merge base.
pub const SKELETON_YAML: &str = r#"meta:
  version: 2
defaults:
  author: env(USER, unknown)
  seed: 1834
directories:
  raw_data: raw_data
  derived_data: derived_data
  results_public: results/public
  results_private: results/private
  settings: settings
  scripts: scripts
  metadata: .atelier
connections:
  databases: {}
data:
  sources: {}
ai:
  enabled: false
  assistant: null
  sync_files: []
git:
  ai_sync: false
  data_security: true
  check_sensitive_dirs: true
"#;

/// Git integration settings (drives pre-commit hook generation)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    /// Sync AI assistant files before committing
    pub ai_sync: bool,
    /// Block commits that stage files from data directories
    pub data_security: bool,
    /// Warn when sensitive directories are not ignored
    pub check_sensitive_dirs: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            ai_sync: false,
            data_security: true,
            check_sensitive_dirs: true,
        }
    }
}

/// AI assistant settings, carried as explicit configuration rather than
/// process environment state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub enabled: bool,
    pub assistant: Option<String>,
    pub sync_files: Vec<String>,
}

/// A settings document
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    doc: Value,
}

impl Settings {
    /// Wrap an already-parsed YAML tree
    pub fn from_value(doc: Value) -> Self {
        Self { doc }
    }

    /// The shipped default settings tree
    pub fn skeleton() -> Self {
        // The skeleton is a compile-time constant and must always parse.
        let doc = serde_yaml::from_str(SKELETON_YAML).expect("skeleton YAML is well-formed");
        Self { doc }
    }

    /// Find a settings file in a directory
    pub fn find_file(dir: &Path) -> Option<PathBuf> {
        for name in SETTINGS_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load a settings document from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let doc: Value = serde_yaml::from_str(&content)?;
        if !doc.is_mapping() {
            return Err(AtelierError::InvalidSettings(format!(
                "{} does not contain a YAML mapping",
                path.display()
            )));
        }
        Ok(Self { doc })
    }

    /// Load the user settings from a project root, searching the candidate
    /// file names.
    pub fn load_from_root(root: &Path) -> Result<(Self, PathBuf)> {
        let path = Self::find_file(root)
            .ok_or_else(|| AtelierError::SettingsNotFound(root.display().to_string()))?;
        let settings = Self::load(&path)?;
        Ok((settings, path))
    }

    /// Save the document to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(&self.doc)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Raw document access
    pub fn doc(&self) -> &Value {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Value {
        &mut self.doc
    }

    /// Look up a value by dotted path, e.g. `connections.databases.main`
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut node = &self.doc;
        for key in path.split('.') {
            node = node.as_mapping()?.get(Value::from(key))?;
        }
        Some(node)
    }

    /// A whole top-level section, if present
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    /// `meta.version`, if present
    pub fn version(&self) -> Option<u64> {
        self.get("meta.version").and_then(Value::as_u64)
    }

    /// Typed view of the `git` section (defaults when absent or partial)
    pub fn git(&self) -> GitSettings {
        self.section("git")
            .cloned()
            .and_then(|v| serde_yaml::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Typed view of the `ai` section
    pub fn ai(&self) -> AiSettings {
        self.section("ai")
            .cloned()
            .and_then(|v| serde_yaml::from_value(v).ok())
            .unwrap_or_default()
    }

    /// The configured directory map (name -> relative path), falling back
    /// to the skeleton's directories when the section is missing.
    pub fn directories(&self) -> Vec<(String, PathBuf)> {
        let section = match self.section("directories").and_then(Value::as_mapping) {
            Some(m) => m.clone(),
            None => {
                let skeleton = Self::skeleton();
                return skeleton.directories();
            }
        };

        let mut dirs = Vec::new();
        for (k, v) in &section {
            if let (Some(name), Some(path)) = (k.as_str(), v.as_str()) {
                dirs.push((name.to_string(), PathBuf::from(path)));
            }
        }
        dirs
    }

    /// Convert the document to JSON for the HTTP API
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let json = serde_json::to_value(&self.doc)?;
        Ok(json)
    }

    /// Parse a settings document from its JSON representation (GUI PUT)
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(&serde_json::to_string(json)?)?;
        if !doc.is_mapping() {
            return Err(AtelierError::InvalidSettings(
                "settings body must be an object".to_string(),
            ));
        }
        Ok(Self { doc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_parses_and_has_expected_sections() {
        let s = Settings::skeleton();
        assert_eq!(s.version(), Some(2));
        assert!(s.section("directories").is_some());
        assert!(s.section("git").is_some());
        let git = s.git();
        assert!(!git.ai_sync);
        assert!(git.data_security);
    }

    #[test]
    fn ai_section_deserializes_with_defaults() {
        let doc = "ai:\n  enabled: true\n  assistant: local-llm\n  sync_files:\n    - NOTES.md\n";
        let s = Settings::from_value(serde_yaml::from_str(doc).unwrap());
        let ai = s.ai();
        assert!(ai.enabled);
        assert_eq!(ai.assistant.as_deref(), Some("local-llm"));
        assert_eq!(ai.sync_files, vec!["NOTES.md"]);

        // absent section falls back to defaults
        let empty = Settings::from_value(serde_yaml::from_str("meta: {}\n").unwrap());
        assert!(!empty.ai().enabled);
        assert!(empty.ai().sync_files.is_empty());
    }

    #[test]
    fn dotted_lookup() {
        let s = Settings::skeleton();
        let v = s.get("directories.raw_data").and_then(Value::as_str);
        assert_eq!(v, Some("raw_data"));
        assert!(s.get("directories.missing").is_none());
    }

    #[test]
    fn find_file_prefers_settings_yml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yml"), "meta: {}\n").unwrap();
        std::fs::write(dir.path().join("settings.yml"), "meta: {}\n").unwrap();
        let found = Settings::find_file(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "settings.yml");
    }

    #[test]
    fn load_rejects_non_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        std::fs::write(&path, "- a\n- b\n").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
