//! Cache store: name -> hash-verified blob with optional expiration.
//!
//! Read-path failures (missing blob, hash mismatch, expired entry) are
//! soft misses: they log a warning, clean up the stale entry, and return
//! `Ok(None)`. Only validation and database failures are hard errors.

use crate::blob;
use crate::db::{CacheRecord, Database};
use crate::error::Result;
use chrono::{Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::warn;

/// The project cache store
#[derive(Clone)]
pub struct CacheStore {
    db: Database,
    dir: PathBuf,
}

impl CacheStore {
    /// Cache blobs live under `.atelier/cache` of the project root.
    pub fn new(db: Database, root: &Path) -> Self {
        Self {
            db,
            dir: root.join(".atelier").join("cache"),
        }
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.bin"))
    }

    /// Store a value, overwriting any previous entry of the same name.
    pub async fn put(
        &self,
        name: &str,
        value: &serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<CacheRecord> {
        blob::validate_name(name)?;

        let bytes = blob::encode_value(value)?;
        let hash = blob::content_hash(&bytes);
        blob::write_blob(&self.blob_path(name), &bytes)?;

        let expire_at = ttl.map(|ttl| Utc::now() + ttl);
        self.db.upsert_cache(name, &hash, expire_at).await?;

        // The record was just written; absence here is a database fault.
        self.db
            .get_cache(name)
            .await?
            .ok_or_else(|| crate::error::StoreError::Other(format!(
                "cache record `{name}` vanished after upsert"
            )))
    }

    /// Fetch a value. Expired or corrupted entries are evicted and count
    /// as misses.
    pub async fn get(&self, name: &str) -> Result<Option<serde_json::Value>> {
        blob::validate_name(name)?;

        let Some(record) = self.db.get_cache(name).await? else {
            return Ok(None);
        };

        if record.is_expired(Utc::now()) {
            self.evict(name, "expired").await;
            return Ok(None);
        }

        let Some(bytes) = blob::read_blob(&self.blob_path(name))? else {
            warn!("cache entry `{}` has no blob file, discarding", name);
            self.evict(name, "missing blob").await;
            return Ok(None);
        };

        if blob::content_hash(&bytes) != record.content_hash {
            warn!("cache entry `{}` is corrupted (hash mismatch), discarding", name);
            self.evict(name, "corrupted").await;
            return Ok(None);
        }

        let value = match blob::decode_value(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!("cache entry `{}` failed to decode ({}), discarding", name, e);
                self.evict(name, "undecodable").await;
                return Ok(None);
            }
        };

        // Housekeeping only: a failed read-timestamp update never fails a hit.
        if let Err(e) = self.db.touch_cache_read(name).await {
            warn!("failed to update last_read_at for `{}`: {}", name, e);
        }

        Ok(Some(value))
    }

    /// Remove an entry and its blob. Returns whether anything existed.
    pub async fn forget(&self, name: &str) -> Result<bool> {
        blob::validate_name(name)?;
        let existed = self.db.delete_cache(name).await?;
        let blob_path = self.blob_path(name);
        if blob_path.exists() {
            std::fs::remove_file(&blob_path)?;
        }
        Ok(existed)
    }

    /// Remove every entry. Returns the number of records dropped.
    pub async fn flush(&self) -> Result<usize> {
        let records = self.db.list_cache().await?;
        for record in &records {
            self.forget(&record.name).await?;
        }
        Ok(records.len())
    }

    /// Drop expired and corrupt entries, returning how many were removed.
    pub async fn prune(&self) -> Result<usize> {
        let now = Utc::now();
        let mut removed = 0;
        for record in self.db.list_cache().await? {
            let stale = record.is_expired(now) || !self.blob_is_intact(&record);
            if stale {
                self.forget(&record.name).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// All current metadata records
    pub async fn list(&self) -> Result<Vec<CacheRecord>> {
        self.db.list_cache().await
    }

    fn blob_is_intact(&self, record: &CacheRecord) -> bool {
        match blob::read_blob(&self.blob_path(&record.name)) {
            Ok(Some(bytes)) => blob::content_hash(&bytes) == record.content_hash,
            _ => false,
        }
    }

    async fn evict(&self, name: &str, reason: &str) {
        tracing::debug!("evicting cache entry `{}` ({})", name, reason);
        if let Err(e) = self.forget(name).await {
            warn!("failed to evict cache entry `{}`: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let cache = CacheStore::new(db, dir.path());
        (dir, cache)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (_dir, cache) = store().await;
        let value = json!({"coef": [0.3, 1.7], "n": 124});

        cache.put("fit", &value, None).await.unwrap();
        assert_eq!(cache.get("fit").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn missing_entry_is_a_miss() {
        let (_dir, cache) = store().await;
        assert_eq!(cache.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn tampered_blob_is_discarded() {
        let (dir, cache) = store().await;
        cache.put("fit", &json!(42), None).await.unwrap();

        let blob_path = dir.path().join(".atelier/cache/fit.bin");
        std::fs::write(&blob_path, b"mangled").unwrap();

        assert_eq!(cache.get("fit").await.unwrap(), None);
        // record and blob are gone afterwards
        assert!(cache.list().await.unwrap().is_empty());
        assert!(!blob_path.exists());
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_get() {
        let (_dir, cache) = store().await;
        cache
            .put("stale", &json!("old"), Some(Duration::seconds(-60)))
            .await
            .unwrap();

        assert_eq!(cache.get("stale").await.unwrap(), None);
        assert!(cache.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unexpired_ttl_still_hits() {
        let (_dir, cache) = store().await;
        cache
            .put("fresh", &json!("new"), Some(Duration::hours(1)))
            .await
            .unwrap();
        assert_eq!(cache.get("fresh").await.unwrap(), Some(json!("new")));
    }

    #[tokio::test]
    async fn forget_removes_record_and_blob() {
        let (dir, cache) = store().await;
        cache.put("tmp", &json!(1), None).await.unwrap();

        assert!(cache.forget("tmp").await.unwrap());
        assert!(!cache.forget("tmp").await.unwrap());
        assert!(!dir.path().join(".atelier/cache/tmp.bin").exists());
    }

    #[tokio::test]
    async fn prune_drops_expired_and_corrupt() {
        let (dir, cache) = store().await;
        cache.put("keep", &json!(1), None).await.unwrap();
        cache
            .put("old", &json!(2), Some(Duration::seconds(-1)))
            .await
            .unwrap();
        cache.put("bad", &json!(3), None).await.unwrap();
        std::fs::write(dir.path().join(".atelier/cache/bad.bin"), b"x").unwrap();

        assert_eq!(cache.prune().await.unwrap(), 2);
        let remaining = cache.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "keep");
    }

    #[tokio::test]
    async fn invalid_name_is_fatal() {
        let (_dir, cache) = store().await;
        assert!(cache.put("../oops", &json!(1), None).await.is_err());
        assert!(cache.get("../oops").await.is_err());
    }
}
