//! Partitioned record storage
//!
//! Every partition stores records as JSON bodies under an integer primary
//! key, with an optional secondary index column extracted from the record.

use std::fmt;

use libsql::{params, Connection, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::{PendingFavorite, PendingReview, Restaurant, Review};

/// Named partition of the local store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Restaurants,
    Reviews,
    PendingReviews,
    PendingFavorites,
}

impl Partition {
    /// Every partition, in the order store versions introduce them
    pub const ALL: [Self; 4] = [
        Self::Restaurants,
        Self::Reviews,
        Self::PendingReviews,
        Self::PendingFavorites,
    ];

    /// Public partition name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Restaurants => "restaurants",
            Self::Reviews => "reviews",
            Self::PendingReviews => "pending-reviews",
            Self::PendingFavorites => "pending-favorites",
        }
    }

    pub(crate) const fn table(self) -> &'static str {
        match self {
            Self::Restaurants => "restaurants",
            Self::Reviews => "reviews",
            Self::PendingReviews => "pending_reviews",
            Self::PendingFavorites => "pending_favorites",
        }
    }

    const fn key_column(self) -> &'static str {
        match self {
            Self::Restaurants | Self::Reviews => "id",
            Self::PendingReviews | Self::PendingFavorites => "created_at",
        }
    }

    const fn index_column(self) -> Option<&'static str> {
        match self {
            Self::Restaurants => Some("name"),
            Self::Reviews => Some("restaurant_id"),
            Self::PendingReviews | Self::PendingFavorites => None,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Partition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A value that lives in exactly one partition
pub trait Record: Serialize + DeserializeOwned {
    const PARTITION: Partition;

    /// Primary key within the partition
    fn key(&self) -> i64;

    /// Secondary index value, for partitions that have one
    fn index_value(&self) -> Value {
        Value::Null
    }
}

impl Record for Restaurant {
    const PARTITION: Partition = Partition::Restaurants;

    fn key(&self) -> i64 {
        self.id
    }

    fn index_value(&self) -> Value {
        Value::Text(self.name.clone())
    }
}

impl Record for Review {
    const PARTITION: Partition = Partition::Reviews;

    fn key(&self) -> i64 {
        self.id
    }

    fn index_value(&self) -> Value {
        Value::Integer(self.restaurant_id)
    }
}

impl Record for PendingReview {
    const PARTITION: Partition = Partition::PendingReviews;

    fn key(&self) -> i64 {
        self.created_at
    }
}

impl Record for PendingFavorite {
    const PARTITION: Partition = Partition::PendingFavorites;

    fn key(&self) -> i64 {
        self.created_at
    }
}

/// Trait for partition storage operations (async)
#[allow(async_fn_in_trait)]
pub trait RecordRepository {
    /// Upsert records by primary key, all or nothing
    async fn put<R: Record>(&self, records: &[R]) -> Result<()>;

    /// Remove one record by primary key; no-op if absent
    async fn delete(&self, partition: Partition, key: i64) -> Result<()>;

    /// Full snapshot of a partition in key order; empty when it has no rows
    async fn get_all<R: Record>(&self) -> Result<Vec<R>>;

    /// Records whose secondary index equals `value`, in key order
    async fn get_by_index<R: Record>(&self, value: Value) -> Result<Vec<R>>;
}

/// libSQL implementation of `RecordRepository`
pub struct LibSqlRecordRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlRecordRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn upsert_sql(partition: Partition) -> String {
        let table = partition.table();
        let key = partition.key_column();
        match partition.index_column() {
            Some(index) => {
                format!("INSERT OR REPLACE INTO {table} ({key}, {index}, body) VALUES (?, ?, ?)")
            }
            None => format!("INSERT OR REPLACE INTO {table} ({key}, body) VALUES (?, ?)"),
        }
    }

    async fn collect<R: Record>(mut rows: libsql::Rows) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let body: String = row.get(0)?;
            records.push(serde_json::from_str(&body)?);
        }
        Ok(records)
    }

    async fn put_all<R: Record>(&self, records: &[R]) -> Result<()> {
        let sql = Self::upsert_sql(R::PARTITION);
        let indexed = R::PARTITION.index_column().is_some();

        for record in records {
            let body = serde_json::to_string(record)?;
            if indexed {
                self.conn
                    .execute(&sql, params![record.key(), record.index_value(), body])
                    .await?;
            } else {
                self.conn.execute(&sql, params![record.key(), body]).await?;
            }
        }
        Ok(())
    }
}

impl RecordRepository for LibSqlRecordRepository<'_> {
    async fn put<R: Record>(&self, records: &[R]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        if let Err(e) = self.put_all(records).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    async fn delete(&self, partition: Partition, key: i64) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            partition.table(),
            partition.key_column()
        );
        self.conn.execute(&sql, [key]).await?;
        Ok(())
    }

    async fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let partition = R::PARTITION;
        let sql = format!(
            "SELECT body FROM {} ORDER BY {}",
            partition.table(),
            partition.key_column()
        );
        let rows = self.conn.query(&sql, ()).await?;
        Self::collect(rows).await
    }

    async fn get_by_index<R: Record>(&self, value: Value) -> Result<Vec<R>> {
        let partition = R::PARTITION;
        let Some(index) = partition.index_column() else {
            return Err(crate::error::Error::Validation(format!(
                "partition {partition} has no secondary index"
            )));
        };
        let sql = format!(
            "SELECT body FROM {} WHERE {index} = ? ORDER BY {}",
            partition.table(),
            partition.key_column()
        );
        let rows = self.conn.query(&sql, [value]).await?;
        Self::collect(rows).await
    }
}
