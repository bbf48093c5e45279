//! Settings migration (v1 -> v2).
//!
//! Version 1 documents used `default:`/`dirs:` section names and kept
//! database connections at the top level. Migration renames the sections,
//! moves `databases:` under `connections:`, and stamps `meta.version: 2`.
//! A document already at version 2 passes through unchanged.

use serde_yaml::{Mapping, Value};

/// Current settings document version
pub const SETTINGS_VERSION: u64 = 2;

/// Whether a document still needs the v1 -> v2 migration
pub fn needs_migration(doc: &Value) -> bool {
    version_of(doc).map_or(true, |v| v < SETTINGS_VERSION)
}

fn version_of(doc: &Value) -> Option<u64> {
    doc.as_mapping()?
        .get(Value::from("meta"))?
        .as_mapping()?
        .get(Value::from("version"))?
        .as_u64()
}

/// Migrate a document in place. Returns true if anything changed; running
/// on an already-migrated document is a no-op.
pub fn migrate(doc: &mut Value) -> bool {
    if !needs_migration(doc) {
        return false;
    }
    let Some(map) = doc.as_mapping_mut() else {
        return false;
    };

    rename_key(map, "default", "defaults");
    rename_key(map, "dirs", "directories");

    // Top-level `databases:` moves under `connections.databases`
    if let Some(databases) = map.remove(Value::from("databases")) {
        let connections = map
            .entry(Value::from("connections"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if let Some(conn_map) = connections.as_mapping_mut() {
            conn_map.insert(Value::from("databases"), databases);
        }
    }

    let meta = map
        .entry(Value::from("meta"))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if let Some(meta_map) = meta.as_mapping_mut() {
        meta_map.insert(Value::from("version"), Value::from(SETTINGS_VERSION));
    }

    true
}

fn rename_key(map: &mut Mapping, from: &str, to: &str) {
    if let Some(value) = map.remove(Value::from(from)) {
        // An existing target section wins; the stale v1 key is dropped.
        if !map.contains_key(Value::from(to)) {
            map.insert(Value::from(to), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn v1_document_is_migrated() {
        let mut doc = yaml(
            "default:\n  seed: 1\ndirs:\n  raw: raw_data\ndatabases:\n  main:\n    driver: sqlite\n",
        );
        assert!(needs_migration(&doc));
        assert!(migrate(&mut doc));

        assert_eq!(
            doc,
            yaml(
                "defaults:\n  seed: 1\ndirectories:\n  raw: raw_data\nconnections:\n  databases:\n    main:\n      driver: sqlite\nmeta:\n  version: 2\n"
            )
        );
    }

    #[test]
    fn missing_version_counts_as_v1() {
        let doc = yaml("defaults: {}\n");
        assert!(needs_migration(&doc));
    }

    #[test]
    fn migration_runs_exactly_once() {
        let mut doc = yaml("dirs:\n  raw: raw_data\n");
        assert!(migrate(&mut doc));
        let after_first = doc.clone();

        assert!(!needs_migration(&doc));
        assert!(!migrate(&mut doc));
        assert_eq!(doc, after_first);
    }

    #[test]
    fn v2_document_passes_through() {
        let original = yaml("meta:\n  version: 2\ndefaults:\n  seed: 3\n");
        let mut doc = original.clone();
        assert!(!migrate(&mut doc));
        assert_eq!(doc, original);
    }
}
