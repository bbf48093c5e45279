//! Result store: public/private analysis results with optional encryption.
//!
//! Blobs live under `results/public` or `results/private` depending on the
//! record's visibility. A blind result is encrypted with the project key
//! before it touches disk; failure to decrypt on read is fatal, unlike the
//! soft misses used for hash mismatches.

use crate::blob;
use crate::crypto::ProjectKey;
use crate::db::{Database, ResultRecord};
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Options for saving a result
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Publish under `results/public` (otherwise `results/private`)
    pub public: bool,
    /// Encrypt at rest with the project key
    pub blind: bool,
    /// Free-form result type label
    pub kind: String,
    pub comment: Option<String>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            public: false,
            blind: false,
            kind: "value".to_string(),
            comment: None,
        }
    }
}

/// The project result store
#[derive(Clone)]
pub struct ResultStore {
    db: Database,
    root: PathBuf,
    key: Arc<ProjectKey>,
}

impl ResultStore {
    pub fn new(db: Database, root: &Path, key: Arc<ProjectKey>) -> Self {
        Self {
            db,
            root: root.to_path_buf(),
            key,
        }
    }

    fn blob_path(&self, name: &str, public: bool) -> PathBuf {
        let visibility = if public { "public" } else { "private" };
        self.root.join("results").join(visibility).join(format!("{name}.bin"))
    }

    /// Save a result, overwriting any previous entry of the same name.
    /// A visibility change moves the blob between directories.
    pub async fn save(
        &self,
        name: &str,
        value: &serde_json::Value,
        opts: &SaveOptions,
    ) -> Result<ResultRecord> {
        blob::validate_name(name)?;

        let plain = blob::encode_value(value)?;
        let bytes = if opts.blind {
            self.key.encrypt(&plain)?
        } else {
            plain
        };
        // The hash covers the bytes as stored, ciphertext included.
        let hash = blob::content_hash(&bytes);

        if let Some(previous) = self.db.get_result(name).await? {
            if previous.public != opts.public {
                let old = self.blob_path(name, previous.public);
                if old.exists() {
                    std::fs::remove_file(&old)?;
                }
            }
        }

        blob::write_blob(&self.blob_path(name, opts.public), &bytes)?;
        self.db
            .upsert_result(
                name,
                &opts.kind,
                opts.public,
                opts.blind,
                opts.comment.as_deref(),
                &hash,
            )
            .await?;

        self.db
            .get_result(name)
            .await?
            .ok_or_else(|| crate::error::StoreError::Other(format!(
                "result record `{name}` vanished after upsert"
            )))
    }

    /// Read a result back. Integrity failures are soft misses; a blind
    /// result that fails to decrypt is a hard error.
    pub async fn read(&self, name: &str) -> Result<Option<serde_json::Value>> {
        blob::validate_name(name)?;

        let Some(record) = self.db.get_result(name).await? else {
            return Ok(None);
        };

        let path = self.blob_path(name, record.public);
        let Some(bytes) = blob::read_blob(&path)? else {
            warn!("result `{}` has no blob file, discarding record", name);
            self.discard(name, record.public).await;
            return Ok(None);
        };

        if blob::content_hash(&bytes) != record.content_hash {
            warn!("result `{}` is corrupted (hash mismatch), discarding", name);
            self.discard(name, record.public).await;
            return Ok(None);
        }

        let plain = if record.blind {
            // fatal by design: silent data loss on key mismatch is worse
            // than an error the caller must see
            self.key.decrypt(&bytes, name)?
        } else {
            bytes
        };

        match blob::decode_value(&plain) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("result `{}` failed to decode ({}), discarding", name, e);
                self.discard(name, record.public).await;
                Ok(None)
            }
        }
    }

    /// Metadata for a single result
    pub async fn record(&self, name: &str) -> Result<Option<ResultRecord>> {
        blob::validate_name(name)?;
        self.db.get_result(name).await
    }

    /// Remove a result and its blob. Returns whether anything existed.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        blob::validate_name(name)?;
        let record = self.db.get_result(name).await?;
        let existed = self.db.delete_result(name).await?;
        if let Some(record) = record {
            let path = self.blob_path(name, record.public);
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(existed)
    }

    /// List result metadata, optionally filtered by visibility.
    pub async fn list(&self, public: Option<bool>) -> Result<Vec<ResultRecord>> {
        self.db.list_results(public).await
    }

    async fn discard(&self, name: &str, public: bool) {
        if let Err(e) = self.db.delete_result(name).await {
            warn!("failed to discard result record `{}`: {}", name, e);
        }
        let path = self.blob_path(name, public);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("failed to remove result blob `{}`: {}", name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;

    async fn store() -> (tempfile::TempDir, ResultStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let key = Arc::new(ProjectKey::load_or_create(dir.path()).unwrap());
        let results = ResultStore::new(db, dir.path(), key);
        (dir, results)
    }

    #[tokio::test]
    async fn public_result_round_trips() {
        let (dir, results) = store().await;
        let value = json!({"table": [[1, 2], [3, 4]]});

        let opts = SaveOptions {
            public: true,
            ..Default::default()
        };
        results.save("summary", &value, &opts).await.unwrap();

        assert!(dir.path().join("results/public/summary.bin").exists());
        assert_eq!(results.read("summary").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn blind_result_is_encrypted_on_disk() {
        let (dir, results) = store().await;
        let value = json!({"patient_ids": [101, 102]});

        let opts = SaveOptions {
            blind: true,
            ..Default::default()
        };
        results.save("cohort", &value, &opts).await.unwrap();

        let raw = std::fs::read(dir.path().join("results/private/cohort.bin")).unwrap();
        let plain = blob::encode_value(&value).unwrap();
        assert_ne!(raw, plain);
        assert!(!raw.windows(plain.len()).any(|w| w == plain.as_slice()));

        assert_eq!(results.read("cohort").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn wrong_key_is_a_hard_error() {
        let (dir, results) = store().await;
        let opts = SaveOptions {
            blind: true,
            ..Default::default()
        };
        results.save("cohort", &json!(1), &opts).await.unwrap();

        // reopen the store with a different key
        let db = Database::open(dir.path()).await.unwrap();
        let wrong = Arc::new(ProjectKey::from_bytes([9u8; 32]));
        let other = ResultStore::new(db, dir.path(), wrong);

        let err = other.read("cohort").await.unwrap_err();
        assert!(matches!(err, StoreError::Decryption(_)));
    }

    #[tokio::test]
    async fn corrupted_result_is_a_soft_miss() {
        let (dir, results) = store().await;
        results
            .save("r", &json!("data"), &SaveOptions::default())
            .await
            .unwrap();

        std::fs::write(dir.path().join("results/private/r.bin"), b"junk").unwrap();
        assert_eq!(results.read("r").await.unwrap(), None);
        assert!(results.record("r").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn visibility_change_moves_the_blob() {
        let (dir, results) = store().await;
        results
            .save("report", &json!("v1"), &SaveOptions::default())
            .await
            .unwrap();
        assert!(dir.path().join("results/private/report.bin").exists());

        let opts = SaveOptions {
            public: true,
            ..Default::default()
        };
        results.save("report", &json!("v2"), &opts).await.unwrap();

        assert!(!dir.path().join("results/private/report.bin").exists());
        assert!(dir.path().join("results/public/report.bin").exists());
        assert_eq!(results.read("report").await.unwrap(), Some(json!("v2")));
    }

    #[tokio::test]
    async fn remove_deletes_record_and_blob() {
        let (dir, results) = store().await;
        results
            .save("tmp", &json!(0), &SaveOptions::default())
            .await
            .unwrap();

        assert!(results.remove("tmp").await.unwrap());
        assert!(!results.remove("tmp").await.unwrap());
        assert!(!dir.path().join("results/private/tmp.bin").exists());
    }
}
