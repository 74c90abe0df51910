//! Staging records for writes made while disconnected.
//!
//! Both kinds are keyed by `createdAt`, the client-side creation stamp in
//! unix milliseconds. It is the only identity an entry has before the
//! server acknowledges it; a second entry with the same stamp overwrites
//! the first.

use serde::{Deserialize, Serialize};

use super::review::{NewReview, Review};

/// A review waiting to be posted to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(flatten)]
    pub review: NewReview,
}

impl PendingReview {
    pub const fn new(review: NewReview, created_at: i64) -> Self {
        Self { created_at, review }
    }

    /// Local confirmed record for this entry, built from the server's answer.
    ///
    /// The client stamp replaces the server's `createdAt` so the confirmed
    /// copy can be matched back to the pending entry it came from.
    #[must_use]
    pub fn confirm(&self, mut server: Review) -> Review {
        server.created_at = Some(self.created_at);
        server
    }

    /// Whether `review` is the confirmed copy of this entry.
    pub fn is_confirmed_by(&self, review: &Review) -> bool {
        review.restaurant_id == self.review.restaurant_id
            && review.created_at == Some(self.created_at)
    }
}

/// A favorite toggle waiting to be sent to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFavorite {
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    pub restaurant_id: i64,
    /// Requested favorite state
    pub checked: bool,
}

impl PendingFavorite {
    pub const fn new(restaurant_id: i64, checked: bool, created_at: i64) -> Self {
        Self {
            created_at,
            restaurant_id,
            checked,
        }
    }
}
