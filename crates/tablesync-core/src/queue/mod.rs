//! Offline mutation queue.
//!
//! User writes (reviews, favorite toggles) go through here. The queue checks
//! connectivity itself at call time: online writes are sent to the remote
//! service and the confirmed result is stored; offline writes are stamped
//! with `createdAt = now` and staged in the matching pending partition until
//! the synchronizer delivers them. An online write that fails transiently is
//! staged the same way, while one the service rejects is returned as an error.

mod connectivity;
pub mod merge;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use connectivity::{Connectivity, ConnectivityFlag};
pub use merge::ReviewEntry;

use crate::cache::ReadThroughCache;
use crate::db::Partition;
use crate::error::{Error, Result};
use crate::models::{FavoriteStatus, NewReview, PendingFavorite, PendingReview, Restaurant, Review};
use crate::remote::RemoteGateway;
use crate::services::StoreService;
use crate::util::unix_millis_now;

/// Where a write ended up
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<D, Q> {
    /// Accepted by the remote service
    Delivered(D),
    /// Staged locally for the next sync
    Queued(Q),
}

impl<D, Q> WriteOutcome<D, Q> {
    pub const fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }
}

pub type ReviewOutcome = WriteOutcome<Review, PendingReview>;
pub type FavoriteOutcome = WriteOutcome<Restaurant, PendingFavorite>;

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub struct OfflineQueue<G, C> {
    gateway: Arc<G>,
    store: Option<StoreService>,
    connectivity: C,
    clock: Clock,
}

impl<G: RemoteGateway, C: Connectivity> OfflineQueue<G, C> {
    /// Create a queue; without a store, offline writes fail with
    /// [`Error::StoreUnavailable`].
    pub fn new(gateway: Arc<G>, store: Option<StoreService>, connectivity: C) -> Self {
        Self {
            gateway,
            store,
            connectivity,
            clock: Arc::new(unix_millis_now),
        }
    }

    /// Replace the `createdAt` source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub const fn connectivity(&self) -> &C {
        &self.connectivity
    }

    /// Submit a review, queueing it when offline or when delivery fails
    /// transiently.
    pub async fn submit_review(&self, review: NewReview) -> Result<ReviewOutcome> {
        review.validate()?;

        if self.connectivity.is_online() {
            match self.gateway.create_review(&review).await {
                Ok(created) => {
                    self.remember(&[created.clone()]).await;
                    return Ok(WriteOutcome::Delivered(created));
                }
                Err(error) if error.is_transient() => {
                    warn!("Posting review failed, queueing it for sync: {error}");
                }
                Err(error) => return Err(error.into()),
            }
        }

        let pending = PendingReview::new(review, (self.clock)());
        self.require_store()?.put(&[pending.clone()]).await?;
        info!(
            created_at = pending.created_at,
            restaurant_id = pending.review.restaurant_id,
            "Review saved offline"
        );
        Ok(WriteOutcome::Queued(pending))
    }

    /// Set or clear a favorite, queueing the toggle when offline or when
    /// delivery fails transiently.
    pub async fn toggle_favorite(&self, restaurant_id: i64, checked: bool) -> Result<FavoriteOutcome> {
        if self.connectivity.is_online() {
            match self.gateway.set_favorite(restaurant_id, checked).await {
                Ok(restaurant) => {
                    self.remember(&[restaurant.clone()]).await;
                    return Ok(WriteOutcome::Delivered(restaurant));
                }
                Err(error) if error.is_transient() => {
                    warn!("Updating favorite failed, queueing it for sync: {error}");
                }
                Err(error) => return Err(error.into()),
            }
        }

        let pending = PendingFavorite::new(restaurant_id, checked, (self.clock)());
        self.require_store()?.put(&[pending]).await?;
        info!(
            created_at = pending.created_at,
            restaurant_id,
            checked,
            "Favorite toggle saved offline"
        );
        Ok(WriteOutcome::Queued(pending))
    }

    /// Every queued review, oldest first.
    pub async fn pending_reviews(&self) -> Result<Vec<PendingReview>> {
        match &self.store {
            Some(store) => store.get_all().await,
            None => Ok(Vec::new()),
        }
    }

    /// Every queued favorite toggle, oldest first.
    pub async fn pending_favorites(&self) -> Result<Vec<PendingFavorite>> {
        match &self.store {
            Some(store) => store.get_all().await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn pending_count(&self) -> Result<usize> {
        Ok(self.pending_reviews().await?.len() + self.pending_favorites().await?.len())
    }

    /// Confirmed reviews of a restaurant followed by its pending ones.
    ///
    /// Confirmed data comes through the read-through cache. When neither the
    /// service nor the store can answer, pending entries are still shown; the
    /// network error surfaces only if there is nothing at all to show.
    pub async fn reviews_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<ReviewEntry>> {
        let pending = self.pending_reviews().await?;
        let confirmed = match self.confirmed().reviews_for_restaurant(restaurant_id).await {
            Ok(reviews) => reviews,
            Err(error) if error.is_network() => {
                let queued = pending.iter().any(|entry| entry.review.restaurant_id == restaurant_id);
                if !queued {
                    return Err(error);
                }
                debug!("No confirmed reviews for restaurant {restaurant_id}: {error}");
                Vec::new()
            }
            Err(error) => return Err(error),
        };

        Ok(merge::merge_reviews(restaurant_id, confirmed, pending))
    }

    /// Effective favorite flag of a restaurant, including queued toggles.
    pub async fn favorite_status(&self, restaurant_id: i64) -> Result<FavoriteStatus> {
        let pending = self.pending_favorites().await?;
        let confirmed = match self.confirmed().restaurant_by_id(restaurant_id).await {
            Ok(restaurant) => Some(restaurant),
            Err(error) if merge::latest_toggle(restaurant_id, &pending).is_some() => {
                debug!("Using queued toggle for restaurant {restaurant_id}: {error}");
                None
            }
            Err(error) => return Err(error),
        };

        Ok(merge::favorite_status(
            restaurant_id,
            confirmed.as_ref(),
            &pending,
        ))
    }

    /// Drop a queued entry without delivering it.
    pub async fn discard(&self, partition: Partition, created_at: i64) -> Result<()> {
        match partition {
            Partition::PendingReviews | Partition::PendingFavorites => {
                self.require_store()?.delete(partition, created_at).await
            }
            other => Err(Error::Validation(format!("{other} is not a pending partition"))),
        }
    }

    fn confirmed(&self) -> ReadThroughCache<G> {
        ReadThroughCache::new(Arc::clone(&self.gateway), self.store.clone())
    }

    fn require_store(&self) -> Result<&StoreService> {
        self.store.as_ref().ok_or_else(|| {
            Error::StoreUnavailable("offline writes need a local store".to_string())
        })
    }

    /// Store a confirmed record; the remote write already succeeded, so a
    /// local failure is only logged.
    async fn remember<R: crate::db::Record>(&self, records: &[R]) {
        if let Some(store) = &self.store {
            if let Err(error) = store.put(records).await {
                warn!("Could not store confirmed {}: {error}", R::PARTITION);
            }
        }
    }
}
