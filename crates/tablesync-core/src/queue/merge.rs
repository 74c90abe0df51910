//! Union of confirmed and pending data as presented to the UI.

use serde::Serialize;

use crate::models::{FavoriteStatus, PendingFavorite, PendingReview, Restaurant, Review};

/// One review line in a restaurant's review list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ReviewEntry {
    Confirmed(Review),
    Pending(PendingReview),
}

impl ReviewEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Confirmed(review) => &review.name,
            Self::Pending(pending) => &pending.review.name,
        }
    }

    pub const fn rating(&self) -> u8 {
        match self {
            Self::Confirmed(review) => review.rating,
            Self::Pending(pending) => pending.review.rating,
        }
    }

    pub fn comments(&self) -> &str {
        match self {
            Self::Confirmed(review) => &review.comments,
            Self::Pending(pending) => &pending.review.comments,
        }
    }

    /// Creation stamp in unix ms, when known
    pub const fn created_at(&self) -> Option<i64> {
        match self {
            Self::Confirmed(review) => review.created_at,
            Self::Pending(pending) => Some(pending.created_at),
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// Confirmed reviews of a restaurant followed by its pending ones.
///
/// Pending entries keep createdAt order. An entry whose confirmed copy is
/// already among `confirmed` is left out, so nothing shows twice.
pub fn merge_reviews(
    restaurant_id: i64,
    confirmed: Vec<Review>,
    pending: Vec<PendingReview>,
) -> Vec<ReviewEntry> {
    let mut pending = pending
        .into_iter()
        .filter(|entry| entry.review.restaurant_id == restaurant_id)
        .filter(|entry| !confirmed.iter().any(|review| entry.is_confirmed_by(review)))
        .collect::<Vec<_>>();
    pending.sort_by_key(|entry| entry.created_at);

    confirmed
        .into_iter()
        .filter(|review| review.restaurant_id == restaurant_id)
        .map(ReviewEntry::Confirmed)
        .chain(pending.into_iter().map(ReviewEntry::Pending))
        .collect()
}

/// Newest queued toggle for a restaurant, if any.
pub fn latest_toggle(restaurant_id: i64, pending: &[PendingFavorite]) -> Option<PendingFavorite> {
    pending
        .iter()
        .filter(|entry| entry.restaurant_id == restaurant_id)
        .max_by_key(|entry| entry.created_at)
        .copied()
}

/// Effective favorite flag: the newest queued toggle wins over the confirmed flag.
pub fn favorite_status(
    restaurant_id: i64,
    confirmed: Option<&Restaurant>,
    pending: &[PendingFavorite],
) -> FavoriteStatus {
    match latest_toggle(restaurant_id, pending) {
        Some(toggle) => FavoriteStatus {
            restaurant_id,
            is_favorite: toggle.checked,
            pending: true,
        },
        None => FavoriteStatus {
            restaurant_id,
            is_favorite: confirmed.is_some_and(|restaurant| restaurant.is_favorite),
            pending: false,
        },
    }
}
