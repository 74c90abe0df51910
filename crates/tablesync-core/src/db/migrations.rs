//! Store upgrade steps
//!
//! Each step creates the partitions introduced by one store version. Opening
//! a store applies, in order, every step above the version already on disk
//! up to the requested one, so a brand-new store opened at version N ends up
//! with every partition of versions 1..=N. Steps only ever add.

use crate::error::{Error, Result};
use libsql::Connection;

/// Highest store version this build knows how to create
pub const CURRENT_VERSION: u32 = 4;

struct UpgradeStep {
    version: u32,
    description: &'static str,
    statements: &'static [&'static str],
}

const UPGRADE_STEPS: &[UpgradeStep] = &[
    UpgradeStep {
        version: 1,
        description: "restaurants partition",
        statements: &[
            "CREATE TABLE IF NOT EXISTS restaurants (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                body TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_restaurants_name ON restaurants(name)",
        ],
    },
    UpgradeStep {
        version: 2,
        description: "reviews partition",
        statements: &[
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                restaurant_id INTEGER NOT NULL,
                body TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_reviews_restaurant_id ON reviews(restaurant_id)",
        ],
    },
    UpgradeStep {
        version: 3,
        description: "pending-reviews partition",
        statements: &["CREATE TABLE IF NOT EXISTS pending_reviews (
                created_at INTEGER PRIMARY KEY,
                body TEXT NOT NULL
            )"],
    },
    UpgradeStep {
        version: 4,
        description: "pending-favorites partition",
        statements: &["CREATE TABLE IF NOT EXISTS pending_favorites (
                created_at INTEGER PRIMARY KEY,
                body TEXT NOT NULL
            )"],
    },
];

/// Bring the store up to `target`, returning the version it ends up at.
///
/// A store already past `target` is left untouched at its own version.
pub async fn run(conn: &Connection, target: u32) -> Result<u32> {
    if target > CURRENT_VERSION {
        return Err(Error::Validation(format!(
            "store version {target} is newer than the supported version {CURRENT_VERSION}"
        )));
    }

    let current = get_version(conn).await?;
    if current >= target {
        if current > target {
            tracing::warn!(
                "Store is at version {current}, newer than requested {target}; keeping it as is"
            );
        }
        return Ok(current);
    }

    for step in UPGRADE_STEPS
        .iter()
        .filter(|step| step.version > current && step.version <= target)
    {
        apply_step(conn, step).await?;
        tracing::info!(
            "Upgraded store to version {} ({})",
            step.version,
            step.description
        );
    }

    Ok(target)
}

/// Get the version recorded in the store, 0 for a cold store
pub async fn get_version(conn: &Connection) -> Result<u32> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i64>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i64 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    u32::try_from(version)
        .map_err(|_| Error::Validation(format!("corrupt store version {version}")))
}

async fn apply_step(conn: &Connection, step: &UpgradeStep) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    let bookkeeping = [
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
    ];

    for stmt in bookkeeping.iter().chain(step.statements) {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn
        .execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?)",
            [i64::from(step.version)],
        )
        .await
    {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    Ok(())
}
