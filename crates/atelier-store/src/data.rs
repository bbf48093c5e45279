//! Data provenance registry.
//!
//! Tracks the source files of a project (raw data imports, external
//! extracts) by path, origin, and content hash, so drift between the
//! recorded state and the file on disk is detectable.

use crate::blob;
use crate::db::{DataRecord, Database};
use crate::error::{Result, StoreError};
use std::path::{Path, PathBuf};

/// Outcome of verifying a registered data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// File content matches the recorded hash
    Intact,
    /// File exists but its content changed since registration
    Drifted { recorded: String, actual: String },
    /// File is gone
    Missing,
}

/// The project data registry
#[derive(Clone)]
pub struct DataRegistry {
    db: Database,
    root: PathBuf,
}

impl DataRegistry {
    pub fn new(db: Database, root: &Path) -> Self {
        Self {
            db,
            root: root.to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Register (or re-register) a data file, hashing its current content.
    pub async fn register(&self, name: &str, path: &str, origin: &str) -> Result<DataRecord> {
        blob::validate_name(name)?;

        let full = self.resolve(path);
        if !full.is_file() {
            return Err(StoreError::Other(format!(
                "data file not found: {}",
                full.display()
            )));
        }
        let hash = blob::file_hash(&full)?;
        self.db.upsert_data(name, path, origin, &hash).await?;

        self.db
            .get_data(name)
            .await?
            .ok_or_else(|| StoreError::Other(format!(
                "data record `{name}` vanished after upsert"
            )))
    }

    /// Re-hash a registered file and compare against the recorded hash.
    pub async fn verify(&self, name: &str) -> Result<Option<Verification>> {
        blob::validate_name(name)?;

        let Some(record) = self.db.get_data(name).await? else {
            return Ok(None);
        };

        let full = self.resolve(&record.path);
        if !full.is_file() {
            return Ok(Some(Verification::Missing));
        }

        let actual = blob::file_hash(&full)?;
        if actual == record.content_hash {
            Ok(Some(Verification::Intact))
        } else {
            Ok(Some(Verification::Drifted {
                recorded: record.content_hash,
                actual,
            }))
        }
    }

    pub async fn get(&self, name: &str) -> Result<Option<DataRecord>> {
        blob::validate_name(name)?;
        self.db.get_data(name).await
    }

    pub async fn list(&self) -> Result<Vec<DataRecord>> {
        self.db.list_data().await
    }

    /// Remove a registry entry. The data file itself is left alone.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        blob::validate_name(name)?;
        self.db.delete_data(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn registry() -> (tempfile::TempDir, DataRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let registry = DataRegistry::new(db, dir.path());
        (dir, registry)
    }

    #[tokio::test]
    async fn register_and_verify_intact() {
        let (dir, registry) = registry().await;
        std::fs::create_dir_all(dir.path().join("raw_data")).unwrap();
        std::fs::write(dir.path().join("raw_data/survey.csv"), "id,score\n1,5\n").unwrap();

        registry
            .register("survey", "raw_data/survey.csv", "field survey 2026")
            .await
            .unwrap();

        assert_eq!(
            registry.verify("survey").await.unwrap(),
            Some(Verification::Intact)
        );
    }

    #[tokio::test]
    async fn drift_is_detected() {
        let (dir, registry) = registry().await;
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a\n").unwrap();
        registry
            .register("d", path.to_str().unwrap(), "import")
            .await
            .unwrap();

        std::fs::write(&path, "b\n").unwrap();
        match registry.verify("d").await.unwrap() {
            Some(Verification::Drifted { recorded, actual }) => assert_ne!(recorded, actual),
            other => panic!("expected drift, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_and_unknown_name() {
        let (dir, registry) = registry().await;
        let path = dir.path().join("gone.csv");
        std::fs::write(&path, "x\n").unwrap();
        registry
            .register("gone", path.to_str().unwrap(), "import")
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            registry.verify("gone").await.unwrap(),
            Some(Verification::Missing)
        );
        assert_eq!(registry.verify("never-registered").await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_requires_existing_file() {
        let (_dir, registry) = registry().await;
        assert!(registry
            .register("nope", "raw_data/absent.csv", "import")
            .await
            .is_err());
    }
}
