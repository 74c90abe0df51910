pub mod common;
pub mod favorite;
pub mod pending;
pub mod restaurants;
pub mod reviews;
pub mod status;
pub mod sync;
