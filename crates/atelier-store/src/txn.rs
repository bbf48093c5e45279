//! Transaction helper.
//!
//! `begin_work` wraps a unit of work in a transaction on the store's single
//! connection. Re-entrant calls are detected via a depth counter: a nested
//! `begin_work` reuses the outer transaction, and only the outermost guard
//! actually issues BEGIN/COMMIT/ROLLBACK.

use crate::db::Database;
use crate::error::{Result, StoreError};
use std::sync::atomic::Ordering;

/// Guard for a unit of transactional work.
///
/// Must be finished explicitly with [`commit`](WorkGuard::commit) or
/// [`rollback`](WorkGuard::rollback); dropping an unfinished guard leaves
/// the outer transaction to decide and logs a warning.
#[must_use = "call commit() or rollback() on the guard"]
pub struct WorkGuard<'a> {
    db: &'a Database,
    outermost: bool,
    finished: bool,
}

impl Database {
    /// Begin (or join) a transaction.
    pub async fn begin_work(&self) -> Result<WorkGuard<'_>> {
        let depth = self.txn_depth.fetch_add(1, Ordering::SeqCst);
        if depth == 0 {
            if let Err(e) = sqlx::query("BEGIN IMMEDIATE").execute(&*self.pool).await {
                self.txn_depth.fetch_sub(1, Ordering::SeqCst);
                return Err(e.into());
            }
        }
        Ok(WorkGuard {
            db: self,
            outermost: depth == 0,
            finished: false,
        })
    }
}

impl WorkGuard<'_> {
    /// Commit the unit of work. Nested guards defer to the outermost one.
    pub async fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.db.txn_depth.fetch_sub(1, Ordering::SeqCst);
        if self.outermost {
            sqlx::query("COMMIT")
                .execute(&*self.db.pool)
                .await
                .map_err(|e| StoreError::Transaction(format!("commit failed: {e}")))?;
        }
        Ok(())
    }

    /// Roll the unit of work back. A nested rollback only unwinds its own
    /// level; the outer transaction stays in charge of the final outcome.
    pub async fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.db.txn_depth.fetch_sub(1, Ordering::SeqCst);
        if self.outermost {
            sqlx::query("ROLLBACK")
                .execute(&*self.db.pool)
                .await
                .map_err(|e| StoreError::Transaction(format!("rollback failed: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.db.txn_depth.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("transaction guard dropped without commit or rollback");
        }
    }
}
