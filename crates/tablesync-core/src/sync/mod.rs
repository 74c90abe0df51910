//! Replays queued offline writes against the remote service.
//!
//! A pending entry is removed only after the server accepted it and the
//! confirmed result is stored. Failures are isolated per entry: a failed
//! entry stays queued and never keeps the others from being sent. Favorite
//! toggles for the same restaurant are sent one after another, oldest first.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::db::Partition;
use crate::error::Result;
use crate::models::{PendingFavorite, PendingReview, Review};
use crate::remote::RemoteGateway;
use crate::services::StoreService;

/// Trigger tag that asks for a sync of offline data
pub const SYNC_OFFLINE_DATA_TAG: &str = "syncOfflineData";

/// Outcome of replaying one pending partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionReport {
    /// Entries found in the partition
    pub attempted: usize,
    /// Entries delivered and removed
    pub confirmed: usize,
    /// Entries still queued afterwards
    pub failed: usize,
}

impl PartitionReport {
    fn tally(outcomes: impl IntoIterator<Item = bool>) -> Self {
        outcomes.into_iter().fold(Self::default(), |mut report, ok| {
            report.attempted += 1;
            if ok {
                report.confirmed += 1;
            } else {
                report.failed += 1;
            }
            report
        })
    }

    fn merge(self, other: Self) -> Self {
        Self {
            attempted: self.attempted + other.attempted,
            confirmed: self.confirmed + other.confirmed,
            failed: self.failed + other.failed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub reviews: PartitionReport,
    pub favorites: PartitionReport,
    /// Pending partitions that could not be read, and so were not replayed
    pub unreadable: Vec<Partition>,
}

impl SyncReport {
    /// Entries known to be left in the pending partitions
    pub const fn remaining(&self) -> usize {
        self.reviews.failed + self.favorites.failed
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0 && self.unreadable.is_empty()
    }
}

pub struct Synchronizer<G> {
    gateway: Arc<G>,
    store: StoreService,
}

impl<G: RemoteGateway> Synchronizer<G> {
    pub const fn new(gateway: Arc<G>, store: StoreService) -> Self {
        Self { gateway, store }
    }

    /// Replay both pending partitions concurrently.
    ///
    /// A partition that cannot be read is listed in
    /// [`SyncReport::unreadable`]; the other one is still replayed and
    /// reported.
    pub async fn run(&self) -> SyncReport {
        let (reviews, favorites) = tokio::join!(self.sync_reviews(), self.sync_favorites());
        let mut report = SyncReport::default();
        report.reviews = Self::settle(Partition::PendingReviews, reviews, &mut report.unreadable);
        report.favorites =
            Self::settle(Partition::PendingFavorites, favorites, &mut report.unreadable);

        if report.reviews.attempted + report.favorites.attempted > 0 {
            info!(
                reviews_confirmed = report.reviews.confirmed,
                favorites_confirmed = report.favorites.confirmed,
                remaining = report.remaining(),
                "Offline data sync finished"
            );
        }
        report
    }

    fn settle(
        partition: Partition,
        outcome: Result<PartitionReport>,
        unreadable: &mut Vec<Partition>,
    ) -> PartitionReport {
        outcome.unwrap_or_else(|error| {
            warn!("Reading {partition} failed, skipping it this run: {error}");
            unreadable.push(partition);
            PartitionReport::default()
        })
    }

    /// Run a sync when `tag` is [`SYNC_OFFLINE_DATA_TAG`]; other tags are ignored.
    pub async fn handle_trigger(&self, tag: &str) -> Option<SyncReport> {
        if tag != SYNC_OFFLINE_DATA_TAG {
            debug!("Ignoring sync trigger '{tag}'");
            return None;
        }
        Some(self.run().await)
    }

    /// Sync every time the watched connectivity goes from offline to online.
    ///
    /// Returns the number of syncs started once the sender side is dropped.
    pub async fn run_on_reconnect(&self, mut online: watch::Receiver<bool>) -> usize {
        let mut was_online = *online.borrow_and_update();
        let mut runs = 0;

        while online.changed().await.is_ok() {
            let is_online = *online.borrow_and_update();
            if is_online && !was_online {
                info!("Connectivity restored, syncing offline data");
                runs += 1;
                self.run().await;
            }
            was_online = is_online;
        }

        runs
    }

    /// Post every queued review.
    pub async fn sync_reviews(&self) -> Result<PartitionReport> {
        let pending: Vec<PendingReview> = self.store.get_all().await?;
        if pending.is_empty() {
            return Ok(PartitionReport::default());
        }
        let confirmed: Vec<Review> = self.store.get_all().await?;

        let outcomes = join_all(
            pending
                .iter()
                .map(|entry| self.replay_review(entry, &confirmed)),
        )
        .await;
        Ok(PartitionReport::tally(outcomes))
    }

    /// Send every queued favorite toggle; toggles of different restaurants
    /// go out concurrently.
    pub async fn sync_favorites(&self) -> Result<PartitionReport> {
        let pending: Vec<PendingFavorite> = self.store.get_all().await?;

        let mut by_restaurant: BTreeMap<i64, Vec<PendingFavorite>> = BTreeMap::new();
        for entry in pending {
            by_restaurant
                .entry(entry.restaurant_id)
                .or_default()
                .push(entry);
        }

        let reports = join_all(
            by_restaurant
                .into_values()
                .map(|toggles| self.replay_favorites(toggles)),
        )
        .await;
        Ok(reports
            .into_iter()
            .fold(PartitionReport::default(), PartitionReport::merge))
    }

    async fn replay_review(&self, entry: &PendingReview, confirmed: &[Review]) -> bool {
        if confirmed.iter().any(|review| entry.is_confirmed_by(review)) {
            debug!(
                created_at = entry.created_at,
                "Review already confirmed, dropping pending copy"
            );
            return self.retire(Partition::PendingReviews, entry.created_at).await;
        }

        let server = match self.gateway.create_review(&entry.review).await {
            Ok(server) => server,
            Err(error) => {
                warn!(created_at = entry.created_at, "Replaying review failed: {error}");
                return false;
            }
        };

        if let Err(error) = self.store.put(&[entry.confirm(server)]).await {
            warn!(created_at = entry.created_at, "Storing confirmed review failed: {error}");
            return false;
        }
        self.retire(Partition::PendingReviews, entry.created_at).await
    }

    async fn replay_favorites(&self, mut toggles: Vec<PendingFavorite>) -> PartitionReport {
        toggles.sort_by_key(|entry| entry.created_at);
        let mut report = PartitionReport {
            attempted: toggles.len(),
            ..PartitionReport::default()
        };

        for entry in &toggles {
            if self.replay_favorite(entry).await {
                report.confirmed += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    async fn replay_favorite(&self, entry: &PendingFavorite) -> bool {
        let restaurant = match self
            .gateway
            .set_favorite(entry.restaurant_id, entry.checked)
            .await
        {
            Ok(restaurant) => restaurant,
            Err(error) => {
                warn!(
                    created_at = entry.created_at,
                    restaurant_id = entry.restaurant_id,
                    "Replaying favorite toggle failed: {error}"
                );
                return false;
            }
        };

        if let Err(error) = self.store.put(&[restaurant]).await {
            warn!(
                restaurant_id = entry.restaurant_id,
                "Storing confirmed restaurant failed: {error}"
            );
            return false;
        }
        self.retire(Partition::PendingFavorites, entry.created_at).await
    }

    async fn retire(&self, partition: Partition, created_at: i64) -> bool {
        match self.store.delete(partition, created_at).await {
            Ok(()) => true,
            Err(error) => {
                warn!(created_at, "Removing entry from {partition} failed: {error}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CURRENT_VERSION;
    use crate::models::{NewReview, Restaurant};
    use crate::queue::{ConnectivityFlag, OfflineQueue};
    use crate::test_support::{five_restaurants, restaurant, FakeGateway};
    use pretty_assertions::assert_eq;

    async fn setup(gateway: FakeGateway) -> (Arc<FakeGateway>, StoreService, Synchronizer<FakeGateway>) {
        let gateway = Arc::new(gateway);
        let store = StoreService::open_in_memory(CURRENT_VERSION).await.unwrap();
        let sync = Synchronizer::new(Arc::clone(&gateway), store.clone());
        (gateway, store, sync)
    }

    fn pending_review(comments: &str, created_at: i64) -> PendingReview {
        PendingReview::new(NewReview::new(1, "Ann", 4, comments), created_at)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_favorite_is_delivered_on_sync() {
        let mut restaurants = five_restaurants();
        restaurants.push(restaurant(7, "Katz's Delicatessen", "deli", "downtown"));
        let (gateway, store, sync) = setup(FakeGateway::new(restaurants, vec![])).await;

        let queue = OfflineQueue::new(
            Arc::clone(&gateway),
            Some(store.clone()),
            ConnectivityFlag::new(false),
        )
        .with_clock(|| 1000);
        queue.toggle_favorite(7, true).await.unwrap();
        assert_eq!(
            queue.pending_favorites().await.unwrap(),
            vec![PendingFavorite::new(7, true, 1000)]
        );

        let flag = ConnectivityFlag::new(false);
        let watcher = sync.run_on_reconnect(flag.subscribe());
        let reconnect = async move {
            tokio::task::yield_now().await;
            flag.set_online(true);
        };
        let (runs, ()) = tokio::join!(watcher, reconnect);
        assert_eq!(runs, 1);
        assert_eq!(gateway.calls(), vec!["set_favorite 7 true".to_string()]);

        assert!(queue.pending_favorites().await.unwrap().is_empty());
        let stored: Vec<Restaurant> = store.get_all().await.unwrap();
        let katz = stored.iter().find(|r| r.id == 7).unwrap();
        assert!(katz.is_favorite);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn one_failed_review_does_not_block_others() {
        let (gateway, store, sync) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        store
            .put(&[
                pending_review("one", 1000),
                pending_review("two", 2000),
                pending_review("three", 3000),
            ])
            .await
            .unwrap();
        gateway.fail_reviews_with("two");

        let report = sync.run().await;
        assert_eq!(
            report.reviews,
            PartitionReport {
                attempted: 3,
                confirmed: 2,
                failed: 1,
            }
        );

        let left: Vec<PendingReview> = store.get_all().await.unwrap();
        assert_eq!(left, vec![pending_review("two", 2000)]);

        let confirmed: Vec<Review> = store.get_all().await.unwrap();
        let mut stamps = confirmed.iter().filter_map(|r| r.created_at).collect::<Vec<_>>();
        stamps.sort_unstable();
        assert_eq!(stamps, vec![1000, 3000]);

        gateway.clear_failures();
        let retry = sync.run().await;
        assert_eq!(retry.reviews.confirmed, 1);
        assert!(store.get_all::<PendingReview>().await.unwrap().is_empty());
        assert_eq!(gateway.server_reviews().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn already_confirmed_review_is_not_posted_again() {
        let (gateway, store, sync) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        let entry = pending_review("kept", 1000);
        let server = Review {
            id: 55,
            restaurant_id: 1,
            name: "Ann".into(),
            rating: 4,
            comments: "kept".into(),
            created_at: None,
            updated_at: None,
        };
        store.put(&[entry.confirm(server)]).await.unwrap();
        store.put(&[entry]).await.unwrap();

        let report = sync.sync_reviews().await.unwrap();
        assert_eq!(report.confirmed, 1);
        assert!(gateway.calls().is_empty());
        assert!(store.get_all::<PendingReview>().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_favorite_toggle_does_not_block_later_ones() {
        let (gateway, store, sync) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        store
            .put(&[
                PendingFavorite::new(2, true, 1000),
                PendingFavorite::new(2, false, 2000),
                PendingFavorite::new(2, true, 3000),
            ])
            .await
            .unwrap();
        gateway.fail_favorite_toggle(2, false);

        let report = sync.sync_favorites().await.unwrap();
        assert_eq!(
            report,
            PartitionReport {
                attempted: 3,
                confirmed: 2,
                failed: 1,
            }
        );
        assert_eq!(
            gateway.calls(),
            vec![
                "set_favorite 2 true".to_string(),
                "set_favorite 2 false".to_string(),
                "set_favorite 2 true".to_string(),
            ]
        );
        assert_eq!(
            store.get_all::<PendingFavorite>().await.unwrap(),
            vec![PendingFavorite::new(2, false, 2000)]
        );
        assert!(gateway.server_restaurant(2).unwrap().is_favorite);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn favorite_toggles_replay_per_restaurant_in_order() {
        let mut restaurants = five_restaurants();
        restaurants.push(restaurant(7, "Katz's Delicatessen", "deli", "downtown"));
        let (gateway, store, sync) = setup(FakeGateway::new(restaurants, vec![])).await;
        store
            .put(&[
                PendingFavorite::new(7, true, 1000),
                PendingFavorite::new(3, true, 1500),
                PendingFavorite::new(7, false, 2000),
            ])
            .await
            .unwrap();
        gateway.fail_favorites_for(7);

        let report = sync.sync_favorites().await.unwrap();
        assert_eq!(
            report,
            PartitionReport {
                attempted: 3,
                confirmed: 1,
                failed: 2,
            }
        );
        let sevens = gateway
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("set_favorite 7"))
            .collect::<Vec<_>>();
        assert_eq!(sevens, vec!["set_favorite 7 true", "set_favorite 7 false"]);

        gateway.clear_failures();
        sync.sync_favorites().await.unwrap();
        assert!(!gateway.server_restaurant(7).unwrap().is_favorite);
        assert!(gateway.server_restaurant(3).unwrap().is_favorite);
        assert!(store.get_all::<PendingFavorite>().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreadable_partition_does_not_hide_the_other_report() {
        let gateway = Arc::new(FakeGateway::new(five_restaurants(), vec![]));
        let store = StoreService::open_in_memory(3).await.unwrap();
        let sync = Synchronizer::new(Arc::clone(&gateway), store.clone());
        store.put(&[pending_review("one", 1000)]).await.unwrap();

        let report = sync.run().await;
        assert_eq!(report.reviews.confirmed, 1);
        assert_eq!(report.unreadable, vec![Partition::PendingFavorites]);
        assert!(!report.is_complete());
        assert!(store.get_all::<PendingReview>().await.unwrap().is_empty());
        assert_eq!(gateway.server_reviews().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_service_keeps_everything_queued() {
        let (gateway, store, sync) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        store.put(&[pending_review("one", 1000)]).await.unwrap();
        store.put(&[PendingFavorite::new(2, true, 1000)]).await.unwrap();
        gateway.set_offline(true);

        let report = sync.run().await;
        assert_eq!(report.remaining(), 2);
        assert_eq!(store.get_all::<PendingReview>().await.unwrap().len(), 1);
        assert_eq!(store.get_all::<PendingFavorite>().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn only_the_offline_data_tag_triggers_sync() {
        let (gateway, store, sync) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        store.put(&[PendingFavorite::new(2, true, 1000)]).await.unwrap();

        assert!(sync.handle_trigger("periodicRefresh").await.is_none());
        assert!(gateway.calls().is_empty());

        let report = sync
            .handle_trigger(SYNC_OFFLINE_DATA_TAG)
            .await
            .unwrap();
        assert_eq!(report.favorites.confirmed, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reconnect_starts_a_sync() {
        let (_, store, sync) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        store.put(&[PendingFavorite::new(4, true, 1000)]).await.unwrap();

        let flag = ConnectivityFlag::new(false);
        let watcher = sync.run_on_reconnect(flag.subscribe());
        let driver = async move {
            tokio::task::yield_now().await;
            flag.set_online(true);
            drop(flag);
        };

        let (runs, ()) = tokio::join!(watcher, driver);
        assert_eq!(runs, 1);
        assert!(store.get_all::<PendingFavorite>().await.unwrap().is_empty());
    }
}
