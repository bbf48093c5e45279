//! SQLite metadata database (embedded, no external dependencies).
//!
//! One file per project at `.atelier/metadata.db`, holding the `meta`,
//! `cache`, `results`, and `data` tables. The pool is capped at a single
//! connection: the store is a process-local, single-writer system.

use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Schema version recorded in the `meta` table
pub const SCHEMA_VERSION: &str = "1";

/// A cache entry's metadata
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CacheRecord {
    pub name: String,
    pub content_hash: String,
    pub expire_at: Option<DateTime<Utc>>,
    pub last_read_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Whether the entry is past its expiration
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|at| at <= now)
    }
}

/// A result entry's metadata
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ResultRecord {
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub public: bool,
    pub blind: bool,
    pub comment: Option<String>,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A data provenance entry
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DataRecord {
    pub name: String,
    pub path: String,
    pub origin: String,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The project metadata database
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: Arc<SqlitePool>,
    pub(crate) txn_depth: Arc<AtomicUsize>,
}

impl Database {
    /// Open (or create) the metadata database of a project root.
    pub async fn open(root: &Path) -> Result<Self> {
        Self::open_at(&root.join(".atelier").join("metadata.db")).await
    }

    /// Open (or create) a metadata database at an explicit path.
    pub async fn open_at(path: &Path) -> Result<Self> {
        tracing::debug!("opening metadata database at {}", path.display());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        // Single connection: the transaction helper issues BEGIN/COMMIT as
        // plain statements and relies on every query sharing one handle.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
            txn_depth: Arc::new(AtomicUsize::new(0)),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache (
                name TEXT PRIMARY KEY,
                content_hash TEXT NOT NULL,
                expire_at DATETIME,
                last_read_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at DATETIME
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                name TEXT PRIMARY KEY,
                type TEXT NOT NULL DEFAULT 'value',
                public INTEGER NOT NULL DEFAULT 0,
                blind INTEGER NOT NULL DEFAULT 0,
                comment TEXT,
                content_hash TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at DATETIME
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS data (
                name TEXT PRIMARY KEY,
                path TEXT NOT NULL,
                origin TEXT NOT NULL DEFAULT '',
                content_hash TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO meta (key, value) VALUES ('schema_version', ?1)
            ON CONFLICT(key) DO NOTHING
            "#,
        )
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

        Ok(())
    }

    // Meta operations

    pub async fn meta_get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM meta WHERE key = ?1")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn meta_set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meta (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    // Cache operations

    pub async fn upsert_cache(
        &self,
        name: &str,
        content_hash: &str,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cache (name, content_hash, expire_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET
                content_hash = excluded.content_hash,
                expire_at = excluded.expire_at,
                updated_at = datetime('now')
            "#,
        )
        .bind(name)
        .bind(content_hash)
        .bind(expire_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_cache(&self, name: &str) -> Result<Option<CacheRecord>> {
        let row = sqlx::query_as(
            r#"
            SELECT name, content_hash, expire_at, last_read_at, created_at, updated_at
            FROM cache WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_cache(&self) -> Result<Vec<CacheRecord>> {
        let rows = sqlx::query_as(
            r#"
            SELECT name, content_hash, expire_at, last_read_at, created_at, updated_at
            FROM cache ORDER BY name
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn touch_cache_read(&self, name: &str) -> Result<()> {
        sqlx::query("UPDATE cache SET last_read_at = datetime('now') WHERE name = ?1")
            .bind(name)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_cache(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cache WHERE name = ?1")
            .bind(name)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Result operations

    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_result(
        &self,
        name: &str,
        kind: &str,
        public: bool,
        blind: bool,
        comment: Option<&str>,
        content_hash: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO results (name, type, public, blind, comment, content_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(name) DO UPDATE SET
                type = excluded.type,
                public = excluded.public,
                blind = excluded.blind,
                comment = excluded.comment,
                content_hash = excluded.content_hash,
                updated_at = datetime('now')
            "#,
        )
        .bind(name)
        .bind(kind)
        .bind(public)
        .bind(blind)
        .bind(comment)
        .bind(content_hash)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_result(&self, name: &str) -> Result<Option<ResultRecord>> {
        let row = sqlx::query_as(
            r#"
            SELECT name, type, public, blind, comment, content_hash, created_at, updated_at
            FROM results WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_results(&self, public: Option<bool>) -> Result<Vec<ResultRecord>> {
        let rows = match public {
            Some(flag) => {
                sqlx::query_as(
                    r#"
                    SELECT name, type, public, blind, comment, content_hash, created_at, updated_at
                    FROM results WHERE public = ?1 ORDER BY name
                    "#,
                )
                .bind(flag)
                .fetch_all(&*self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT name, type, public, blind, comment, content_hash, created_at, updated_at
                    FROM results ORDER BY name
                    "#,
                )
                .fetch_all(&*self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn delete_result(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM results WHERE name = ?1")
            .bind(name)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Data provenance operations

    pub async fn upsert_data(
        &self,
        name: &str,
        path: &str,
        origin: &str,
        content_hash: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO data (name, path, origin, content_hash)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                path = excluded.path,
                origin = excluded.origin,
                content_hash = excluded.content_hash,
                updated_at = datetime('now')
            "#,
        )
        .bind(name)
        .bind(path)
        .bind(origin)
        .bind(content_hash)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_data(&self, name: &str) -> Result<Option<DataRecord>> {
        let row = sqlx::query_as(
            r#"
            SELECT name, path, origin, content_hash, created_at, updated_at
            FROM data WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_data(&self) -> Result<Vec<DataRecord>> {
        let rows = sqlx::query_as(
            r#"
            SELECT name, path, origin, content_hash, created_at, updated_at
            FROM data ORDER BY name
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_data(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM data WHERE name = ?1")
            .bind(name)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
