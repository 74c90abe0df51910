//! Shared services used by the cache, queue and synchronizer.

mod store;

pub use store::StoreService;
