//! Shared store service wrapper used across components.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libsql::Value;
use tokio::sync::Mutex;

use crate::db::{Database, LibSqlRecordRepository, Partition, Record, RecordRepository};
use crate::Result;

/// Thread-safe handle to the local store.
///
/// Cloning is cheap; all clones share one connection. Each operation holds
/// the connection for its own duration only, so operations from different
/// components interleave between calls.
#[derive(Clone)]
pub struct StoreService {
    db: Arc<Mutex<Database>>,
    path: Option<PathBuf>,
}

impl StoreService {
    /// Open the store at the given filesystem path and upgrade it to `version`.
    pub async fn open_path(path: impl Into<PathBuf>, version: u32) -> Result<Self> {
        let path = path.into();
        let db = Database::open(&path, version).await?;
        tracing::debug!(
            "Opened store {} at version {}",
            path.display(),
            db.version()
        );
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            path: Some(path),
        })
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory(version: u32) -> Result<Self> {
        let db = Database::open_in_memory(version).await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            path: None,
        })
    }

    /// Filesystem location, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store version after upgrades.
    pub async fn version(&self) -> u32 {
        let db = self.db.lock().await;
        db.version()
    }

    /// Partitions present in the store.
    pub async fn partitions(&self) -> Result<Vec<Partition>> {
        let db = self.db.lock().await;
        db.partitions().await
    }

    /// Upsert records into their partition.
    pub async fn put<R: Record>(&self, records: &[R]) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlRecordRepository::new(db.connection());
        repo.put(records).await
    }

    /// Delete one record by key.
    pub async fn delete(&self, partition: Partition, key: i64) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlRecordRepository::new(db.connection());
        repo.delete(partition, key).await
    }

    /// Snapshot of a whole partition.
    pub async fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let db = self.db.lock().await;
        let repo = LibSqlRecordRepository::new(db.connection());
        repo.get_all().await
    }

    /// Records matching a secondary index value.
    pub async fn get_by_index<R: Record>(&self, value: impl Into<Value>) -> Result<Vec<R>> {
        let db = self.db.lock().await;
        let repo = LibSqlRecordRepository::new(db.connection());
        repo.get_by_index(value.into()).await
    }
}
