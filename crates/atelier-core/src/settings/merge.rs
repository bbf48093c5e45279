//! Config merge engine.
//!
//! Overlays a user settings tree onto the skeleton defaults, resolving
//! split-file references (`settings/*.yml`) before overlay and `env(...)`
//! placeholders after. The placeholder grammar is closed: only `env(NAME)`
//! and `env(NAME, default)` are recognized; there is no general expression
//! evaluation.

use crate::settings::model::Settings;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::warn;

/// Matches a split-setting value: a relative path into the project's
/// `settings/` directory.
static SPLIT_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^settings/[A-Za-z0-9][A-Za-z0-9_./-]*\.ya?ml$").unwrap());

/// Matches `env(NAME)` and `env(NAME, default)`.
static ENV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^env\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:,\s*(.*?)\s*)?\)$").unwrap());

/// Overlay `over` onto `base`, key by key.
///
/// Mappings are merged recursively; any non-mapping leaf in `over`
/// (including sequences) replaces the base value wholesale. Merging a tree
/// with itself yields the same tree.
pub fn merge(base: &Value, over: &Value) -> Value {
    match (base, over) {
        (Value::Mapping(base_map), Value::Mapping(over_map)) => {
            let mut out = base_map.clone();
            for (key, over_val) in over_map {
                let merged = match base_map.get(key) {
                    Some(base_val) => merge(base_val, over_val),
                    None => over_val.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Mapping(out)
        }
        _ => over.clone(),
    }
}

/// Resolve split-file references in a user tree.
///
/// A string value matching `settings/*.yml` is replaced by the parsed
/// content of that file (relative to `root`), itself resolved recursively.
/// Any failure to read or parse a satellite file is a warning and the
/// literal placeholder string is retained.
pub fn resolve_split_files(root: &Path, value: &Value) -> Value {
    match value {
        Value::String(s) if SPLIT_FILE_RE.is_match(s) => {
            let path = root.join(s);
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_yaml::from_str::<Value>(&content) {
                    Ok(parsed) => resolve_split_files(root, &parsed),
                    Err(e) => {
                        warn!("split settings file {} failed to parse: {}", s, e);
                        value.clone()
                    }
                },
                Err(e) => {
                    warn!("split settings file {} could not be read: {}", s, e);
                    value.clone()
                }
            }
        }
        Value::Mapping(map) => {
            let mut out = Mapping::new();
            for (k, v) in map {
                out.insert(k.clone(), resolve_split_files(root, v));
            }
            Value::Mapping(out)
        }
        Value::Sequence(seq) => {
            Value::Sequence(seq.iter().map(|v| resolve_split_files(root, v)).collect())
        }
        _ => value.clone(),
    }
}

/// Resolve `env(NAME[, default])` placeholders at read time.
///
/// An unset variable with no default is a warning and the literal
/// placeholder is retained.
pub fn resolve_placeholders(value: &Value) -> Value {
    match value {
        Value::String(s) => match ENV_RE.captures(s) {
            Some(caps) => {
                let name = &caps[1];
                match std::env::var(name) {
                    Ok(val) => Value::String(val),
                    Err(_) => match caps.get(2) {
                        Some(default) => Value::String(default.as_str().to_string()),
                        None => {
                            warn!("environment variable {} is not set, keeping placeholder", name);
                            value.clone()
                        }
                    },
                }
            }
            None => value.clone(),
        },
        Value::Mapping(map) => {
            let mut out = Mapping::new();
            for (k, v) in map {
                out.insert(k.clone(), resolve_placeholders(v));
            }
            Value::Mapping(out)
        }
        Value::Sequence(seq) => {
            Value::Sequence(seq.iter().map(resolve_placeholders).collect())
        }
        _ => value.clone(),
    }
}

/// Produce the effective settings for a project: split files resolved,
/// user values overlaid onto the skeleton, placeholders substituted.
pub fn effective_settings(root: &Path, user: &Settings) -> Settings {
    let skeleton = Settings::skeleton();
    let resolved_user = resolve_split_files(root, user.doc());
    let merged = merge(skeleton.doc(), &resolved_user);
    Settings::from_value(resolve_placeholders(&merged))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn user_scalars_override_skeleton() {
        let base = yaml("a: 1\nb:\n  c: 2\n  d: 3\n");
        let over = yaml("b:\n  c: 9\n");
        let merged = merge(&base, &over);
        assert_eq!(merged, yaml("a: 1\nb:\n  c: 9\n  d: 3\n"));
    }

    #[test]
    fn sequences_replace_wholesale() {
        let base = yaml("xs: [1, 2, 3]\n");
        let over = yaml("xs: [9]\n");
        assert_eq!(merge(&base, &over), yaml("xs: [9]\n"));
    }

    #[test]
    fn merge_is_idempotent_on_skeleton() {
        let skeleton = Settings::skeleton();
        let merged = merge(skeleton.doc(), skeleton.doc());
        assert_eq!(&merged, skeleton.doc());
    }

    #[test]
    fn env_placeholder_resolves() {
        std::env::set_var("ATELIER_TEST_MERGE_VAR", "hello");
        let v = resolve_placeholders(&yaml("x: env(ATELIER_TEST_MERGE_VAR)\n"));
        assert_eq!(v, yaml("x: hello\n"));
    }

    #[test]
    fn env_placeholder_default_and_literal() {
        let v = resolve_placeholders(&yaml("x: env(ATELIER_TEST_UNSET_VAR, fallback)\n"));
        assert_eq!(v, yaml("x: fallback\n"));

        // no default: literal retained
        let v = resolve_placeholders(&yaml("x: env(ATELIER_TEST_UNSET_VAR)\n"));
        assert_eq!(v, yaml("x: env(ATELIER_TEST_UNSET_VAR)\n"));
    }

    #[test]
    fn split_file_is_loaded_and_merged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("settings")).unwrap();
        std::fs::write(
            dir.path().join("settings/db.yml"),
            "host: localhost\nport: 5432\n",
        )
        .unwrap();

        let user = yaml("connections:\n  databases:\n    main: settings/db.yml\n");
        let resolved = resolve_split_files(dir.path(), &user);
        assert_eq!(
            resolved,
            yaml("connections:\n  databases:\n    main:\n      host: localhost\n      port: 5432\n")
        );
    }

    #[test]
    fn missing_split_file_keeps_literal() {
        let dir = tempfile::tempdir().unwrap();
        let user = yaml("data: settings/nope.yml\n");
        let resolved = resolve_split_files(dir.path(), &user);
        assert_eq!(resolved, user);
    }

    #[test]
    fn effective_settings_overlays_user() {
        let dir = tempfile::tempdir().unwrap();
        let user = Settings::from_value(yaml("defaults:\n  seed: 7\n"));
        let effective = effective_settings(dir.path(), &user);
        assert_eq!(
            effective.get("defaults.seed").and_then(Value::as_u64),
            Some(7)
        );
        // skeleton keys survive
        assert!(effective.get("directories.raw_data").is_some());
    }
}
