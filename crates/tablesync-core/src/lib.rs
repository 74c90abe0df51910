//! tablesync-core - Offline-first data layer for a restaurant review client
//!
//! This crate contains the models, local store, read-through cache, offline
//! write queue and synchronizer used by the `tablesync` interfaces.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod queue;
pub mod remote;
pub mod services;
pub mod sync;
pub mod util;

#[cfg(test)]
mod test_support;

pub use cache::ReadThroughCache;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{FavoriteStatus, NewReview, PendingFavorite, PendingReview, Restaurant, Review};
pub use queue::{Connectivity, ConnectivityFlag, OfflineQueue, ReviewEntry, WriteOutcome};
pub use remote::{HttpGateway, NetworkError, RemoteGateway};
pub use services::StoreService;
pub use sync::{SyncReport, Synchronizer, SYNC_OFFLINE_DATA_TAG};
