//! Data models for tablesync

mod pending;
mod restaurant;
mod review;
pub mod wire;

pub use pending::{PendingFavorite, PendingReview};
pub use restaurant::{FavoriteStatus, LatLng, Restaurant};
pub use review::{NewReview, Review};
