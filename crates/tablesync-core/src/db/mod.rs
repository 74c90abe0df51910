//! Persistent store for tablesync
//!
//! A named, versioned store of four partitions: confirmed `restaurants` and
//! `reviews`, plus the `pending-reviews` and `pending-favorites` staging
//! areas for offline writes.

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use migrations::CURRENT_VERSION;
pub use repository::{LibSqlRecordRepository, Partition, Record, RecordRepository};
