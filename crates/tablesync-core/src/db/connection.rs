//! Store connection management

use crate::error::{Error, Result};
use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::Path;

use super::migrations;
use super::repository::Partition;

/// Local record store backed by libSQL
pub struct Database {
    _db: LibSqlDatabase,
    conn: Connection,
    version: u32,
}

impl Database {
    /// Open the store at the given path, creating it if it doesn't exist,
    /// and upgrade it to `version`.
    ///
    /// Any failure to obtain durable storage is reported as
    /// [`Error::StoreUnavailable`] so the host can fall back to remote-only mode.
    pub async fn open(path: impl AsRef<Path>, version: u32) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| {
                Error::StoreUnavailable(format!("{}: {error}", parent.display()))
            })?;
        }

        let path_str = path.to_string_lossy().to_string();
        let db = Builder::new_local(&path_str)
            .build()
            .await
            .map_err(|error| Error::StoreUnavailable(format!("{path_str}: {error}")))?;
        let conn = db
            .connect()
            .map_err(|error| Error::StoreUnavailable(format!("{path_str}: {error}")))?;

        Self::init(db, conn, version).await.map_err(|error| match error {
            Error::LibSql(error) => Error::StoreUnavailable(format!("{path_str}: {error}")),
            other => other,
        })
    }

    /// Open an in-memory store (useful for testing)
    pub async fn open_in_memory(version: u32) -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        let conn = db.connect()?;
        Self::init(db, conn, version).await
    }

    async fn init(db: LibSqlDatabase, conn: Connection, version: u32) -> Result<Self> {
        let mut database = Self {
            _db: db,
            conn,
            version: 0,
        };
        database.configure().await?;
        database.version = migrations::run(&database.conn, version).await?;
        Ok(database)
    }

    /// Configure `SQLite` for a single local writer
    async fn configure(&self) -> Result<()> {
        // In-memory databases reject WAL; ignore.
        self.conn
            .query("PRAGMA journal_mode = WAL;", ())
            .await
            .ok();
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        Ok(())
    }

    /// Store version after upgrades
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Partitions that currently exist in the store, in upgrade order
    pub async fn partitions(&self) -> Result<Vec<Partition>> {
        let mut present = Vec::new();
        for partition in Partition::ALL {
            let mut rows = self
                .conn
                .query(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
                    [partition.table()],
                )
                .await?;
            let exists = match rows.next().await? {
                Some(row) => row.get::<i64>(0)? != 0,
                None => false,
            };
            if exists {
                present.push(partition);
            }
        }
        Ok(present)
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
