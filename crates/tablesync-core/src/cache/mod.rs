//! Read-through cache over the remote gateway.
//!
//! Every base fetch asks the remote service first. A successful answer is
//! written to the local store before it is returned; a failed one is
//! answered from the store's last snapshot of the same partition. Derived
//! queries are computed from the base fetch and never issue extra calls.

pub mod queries;

use std::sync::Arc;

use libsql::Value;
use tracing::{debug, warn};

use crate::db::Record;
use crate::error::{Error, Result};
use crate::models::{Restaurant, Review};
use crate::remote::{NetworkResult, RemoteGateway};
use crate::services::StoreService;

/// Which slice of a partition to fall back to
enum Snapshot {
    All,
    ByIndex(Value),
}

pub struct ReadThroughCache<G> {
    gateway: Arc<G>,
    store: Option<StoreService>,
}

impl<G: RemoteGateway> ReadThroughCache<G> {
    /// Create a cache; without a store it runs remote-only.
    pub const fn new(gateway: Arc<G>, store: Option<StoreService>) -> Self {
        Self { gateway, store }
    }

    /// Whether fetched data is persisted for offline use
    pub const fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub const fn store(&self) -> Option<&StoreService> {
        self.store.as_ref()
    }

    /// All restaurants.
    pub async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        let fetched = self.gateway.list_restaurants().await;
        self.read_through(fetched, Snapshot::All).await
    }

    /// All reviews.
    pub async fn reviews(&self) -> Result<Vec<Review>> {
        let fetched = self.gateway.list_reviews().await;
        self.read_through(fetched, Snapshot::All).await
    }

    /// Reviews of one restaurant; offline, served through the
    /// `restaurant_id` index of the reviews partition.
    pub async fn reviews_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<Review>> {
        let fetched = self.gateway.list_reviews_for_restaurant(restaurant_id).await;
        self.read_through(fetched, Snapshot::ByIndex(Value::Integer(restaurant_id)))
            .await
    }

    pub async fn restaurant_by_id(&self, id: i64) -> Result<Restaurant> {
        self.restaurants()
            .await?
            .into_iter()
            .find(|restaurant| restaurant.id == id)
            .ok_or_else(|| Error::NotFound(format!("restaurant {id}")))
    }

    pub async fn review_by_id(&self, id: i64) -> Result<Review> {
        self.reviews()
            .await?
            .into_iter()
            .find(|review| review.id == id)
            .ok_or_else(|| Error::NotFound(format!("review {id}")))
    }

    pub async fn restaurants_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>> {
        self.restaurants_by_cuisine_and_neighborhood(Some(cuisine), None)
            .await
    }

    pub async fn restaurants_by_neighborhood(&self, neighborhood: &str) -> Result<Vec<Restaurant>> {
        self.restaurants_by_cuisine_and_neighborhood(None, Some(neighborhood))
            .await
    }

    /// Restaurants matching both filters; `None` matches everything.
    pub async fn restaurants_by_cuisine_and_neighborhood(
        &self,
        cuisine: Option<&str>,
        neighborhood: Option<&str>,
    ) -> Result<Vec<Restaurant>> {
        let restaurants = self.restaurants().await?;
        Ok(queries::by_cuisine_and_neighborhood(
            &restaurants,
            cuisine,
            neighborhood,
        ))
    }

    pub async fn neighborhoods(&self) -> Result<Vec<String>> {
        let restaurants = self.restaurants().await?;
        Ok(queries::distinct_neighborhoods(&restaurants))
    }

    pub async fn cuisines(&self) -> Result<Vec<String>> {
        let restaurants = self.restaurants().await?;
        Ok(queries::distinct_cuisines(&restaurants))
    }

    /// Restaurants whose confirmed favorite flag is set.
    pub async fn favorite_restaurants(&self) -> Result<Vec<Restaurant>> {
        let restaurants = self.restaurants().await?;
        Ok(restaurants
            .into_iter()
            .filter(|restaurant| restaurant.is_favorite)
            .collect())
    }

    async fn read_through<R: Record>(
        &self,
        fetched: NetworkResult<Vec<R>>,
        snapshot: Snapshot,
    ) -> Result<Vec<R>> {
        let partition = R::PARTITION;
        match fetched {
            Ok(records) => {
                if let Some(store) = &self.store {
                    match store.put(&records).await {
                        Ok(()) => debug!("Refreshed {partition} with {} records", records.len()),
                        Err(error) => warn!("Could not refresh {partition} cache: {error}"),
                    }
                }
                Ok(records)
            }
            Err(network_error) => {
                warn!("Fetching {partition} failed, falling back to local store: {network_error}");
                let Some(store) = &self.store else {
                    return Err(network_error.into());
                };

                let cached = match snapshot {
                    Snapshot::All => store.get_all::<R>().await,
                    Snapshot::ByIndex(value) => store.get_by_index::<R>(value).await,
                };

                match cached {
                    Ok(records) if !records.is_empty() => {
                        debug!("Serving {} cached {partition} records", records.len());
                        Ok(records)
                    }
                    Ok(_) => Err(network_error.into()),
                    Err(store_error) => {
                        warn!("Reading cached {partition} failed: {store_error}");
                        Err(network_error.into())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CURRENT_VERSION;
    use crate::test_support::{five_restaurants, review, FakeGateway};
    use pretty_assertions::assert_eq;

    async fn setup(gateway: FakeGateway) -> (Arc<FakeGateway>, ReadThroughCache<FakeGateway>) {
        let gateway = Arc::new(gateway);
        let store = StoreService::open_in_memory(CURRENT_VERSION).await.unwrap();
        let cache = ReadThroughCache::new(Arc::clone(&gateway), Some(store));
        (gateway, cache)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn online_fetch_refreshes_store() {
        let (_, cache) = setup(FakeGateway::new(five_restaurants(), vec![])).await;

        let restaurants = cache.restaurants().await.unwrap();
        assert_eq!(restaurants, five_restaurants());

        let stored: Vec<Restaurant> = cache.store().unwrap().get_all().await.unwrap();
        assert_eq!(stored, five_restaurants());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_fetch_returns_exactly_the_cached_snapshot() {
        let reviews = vec![review(1, 1, "good"), review(2, 3, "fine")];
        let (gateway, cache) = setup(FakeGateway::new(five_restaurants(), reviews.clone())).await;

        let online_restaurants = cache.restaurants().await.unwrap();
        let online_reviews = cache.reviews().await.unwrap();

        gateway.set_offline(true);
        assert_eq!(cache.restaurants().await.unwrap(), online_restaurants);
        assert_eq!(cache.reviews().await.unwrap(), online_reviews);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_payload_falls_back_to_store() {
        let (gateway, cache) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        cache.restaurants().await.unwrap();

        gateway.set_empty_payload(true);
        assert_eq!(cache.restaurants().await.unwrap(), five_restaurants());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_fetch_with_empty_store_is_network_error() {
        let (gateway, cache) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        gateway.set_offline(true);

        let result = cache.restaurants().await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn remote_only_without_store() {
        let gateway = Arc::new(FakeGateway::new(five_restaurants(), vec![]));
        let cache = ReadThroughCache::new(Arc::clone(&gateway), None);
        assert!(!cache.is_persistent());

        assert_eq!(cache.restaurants().await.unwrap().len(), 5);
        gateway.set_offline(true);
        assert!(cache.restaurants().await.unwrap_err().is_network());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_reviews_for_restaurant_use_index() {
        let reviews = vec![review(1, 1, "a"), review(2, 2, "b"), review(3, 1, "c")];
        let (gateway, cache) = setup(FakeGateway::new(five_restaurants(), reviews)).await;
        cache.reviews().await.unwrap();

        gateway.set_offline(true);
        let for_one = cache.reviews_for_restaurant(1).await.unwrap();
        assert_eq!(for_one.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

        let none = cache.reviews_for_restaurant(5).await;
        assert!(none.unwrap_err().is_network());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn derived_queries_issue_one_base_fetch_each() {
        let (gateway, cache) = setup(FakeGateway::new(five_restaurants(), vec![])).await;

        let first = cache
            .restaurants_by_cuisine_and_neighborhood(Some("italian"), Some("downtown"))
            .await
            .unwrap();
        let second = cache
            .restaurants_by_cuisine_and_neighborhood(Some("italian"), Some("downtown"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(
            gateway.calls(),
            vec!["list_restaurants".to_string(), "list_restaurants".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn derived_queries_work_offline() {
        let (gateway, cache) = setup(FakeGateway::new(five_restaurants(), vec![])).await;
        cache.restaurants().await.unwrap();
        gateway.set_offline(true);

        assert_eq!(cache.neighborhoods().await.unwrap(), vec!["downtown", "uptown"]);
        assert_eq!(cache.cuisines().await.unwrap(), vec!["italian", "american"]);
        assert_eq!(cache.restaurants_by_cuisine("american").await.unwrap().len(), 2);
        assert_eq!(cache.restaurants_by_neighborhood("uptown").await.unwrap().len(), 2);
        assert_eq!(cache.restaurant_by_id(3).await.unwrap().name, "Emily");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_entities_are_not_found() {
        let (_, cache) = setup(FakeGateway::new(five_restaurants(), vec![review(4, 1, "x")])).await;

        assert!(matches!(cache.restaurant_by_id(42).await, Err(Error::NotFound(_))));
        assert!(matches!(cache.review_by_id(42).await, Err(Error::NotFound(_))));
        assert_eq!(cache.review_by_id(4).await.unwrap().comments, "x");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn favorites_filter_confirmed_flag() {
        let mut restaurants = five_restaurants();
        restaurants[1].is_favorite = true;
        restaurants[4].is_favorite = true;
        let (_, cache) = setup(FakeGateway::new(restaurants, vec![])).await;

        let favorites = cache.favorite_restaurants().await.unwrap();
        assert_eq!(favorites.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 5]);
    }
}
