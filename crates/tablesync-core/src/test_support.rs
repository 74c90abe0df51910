//! In-memory doubles and fixtures shared by the unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use reqwest::StatusCode;

use crate::models::{LatLng, NewReview, Restaurant, Review};
use crate::remote::{NetworkError, NetworkResult, RemoteGateway};

pub fn restaurant(id: i64, name: &str, cuisine: &str, neighborhood: &str) -> Restaurant {
    Restaurant {
        id,
        name: name.to_string(),
        neighborhood: neighborhood.to_string(),
        cuisine_type: cuisine.to_string(),
        address: format!("{id} Main St"),
        latlng: LatLng {
            lat: 40.7,
            lng: -73.9,
        },
        photograph: Some(id.to_string()),
        operating_hours: BTreeMap::from([("Monday".to_string(), "11:00 am - 10:00 pm".to_string())]),
        is_favorite: false,
    }
}

pub fn review(id: i64, restaurant_id: i64, comments: &str) -> Review {
    Review {
        id,
        restaurant_id,
        name: format!("Reviewer {id}"),
        rating: 4,
        comments: comments.to_string(),
        created_at: Some(id * 10),
        updated_at: Some(id * 10),
    }
}

/// Five restaurants with overlapping cuisines and neighborhoods.
pub fn five_restaurants() -> Vec<Restaurant> {
    vec![
        restaurant(1, "Roberta's", "italian", "downtown"),
        restaurant(2, "Hometown BBQ", "american", "uptown"),
        restaurant(3, "Emily", "italian", "uptown"),
        restaurant(4, "Superiority Burger", "american", "downtown"),
        restaurant(5, "Casa Enrique", "italian", "downtown"),
    ]
}

#[derive(Default)]
struct FakeState {
    restaurants: Vec<Restaurant>,
    reviews: Vec<Review>,
    offline: bool,
    empty_payload: bool,
    failing_comments: HashMap<String, StatusCode>,
    failing_favorites: HashSet<i64>,
    failing_toggles: HashSet<(i64, bool)>,
    calls: Vec<String>,
    next_review_id: i64,
}

/// Scriptable in-memory stand-in for the remote service.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

impl FakeGateway {
    pub fn new(restaurants: Vec<Restaurant>, reviews: Vec<Review>) -> Self {
        let gateway = Self::default();
        {
            let mut state = gateway.state.lock().unwrap();
            state.restaurants = restaurants;
            state.reviews = reviews;
            state.next_review_id = 1000;
        }
        gateway
    }

    /// Make every call fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Make list calls answer with a `null` body.
    pub fn set_empty_payload(&self, empty: bool) {
        self.state.lock().unwrap().empty_payload = empty;
    }

    /// Fail review submissions whose comments equal `comments` with a 500.
    pub fn fail_reviews_with(&self, comments: &str) {
        self.reject_reviews_with(comments, StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Answer review submissions whose comments equal `comments` with `status`.
    pub fn reject_reviews_with(&self, comments: &str, status: StatusCode) {
        self.state
            .lock()
            .unwrap()
            .failing_comments
            .insert(comments.to_string(), status);
    }

    /// Fail every favorite update for one restaurant with a 500.
    pub fn fail_favorites_for(&self, restaurant_id: i64) {
        self.state
            .lock()
            .unwrap()
            .failing_favorites
            .insert(restaurant_id);
    }

    /// Fail favorite updates that set `restaurant_id` to `checked` with a 500.
    pub fn fail_favorite_toggle(&self, restaurant_id: i64, checked: bool) {
        self.state
            .lock()
            .unwrap()
            .failing_toggles
            .insert((restaurant_id, checked));
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing_comments.clear();
        state.failing_favorites.clear();
        state.failing_toggles.clear();
    }

    /// Calls received so far, as `"<operation> <argument>"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn server_reviews(&self) -> Vec<Review> {
        self.state.lock().unwrap().reviews.clone()
    }

    pub fn server_restaurant(&self, id: i64) -> Option<Restaurant> {
        self.state
            .lock()
            .unwrap()
            .restaurants
            .iter()
            .find(|restaurant| restaurant.id == id)
            .cloned()
    }

    fn begin(&self, call: String) -> NetworkResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            return Err(NetworkError::Unreachable("fake gateway offline".into()));
        }
        Ok(state)
    }

    fn list<T: Clone>(state: &FakeState, items: Vec<T>) -> NetworkResult<Vec<T>> {
        if state.empty_payload {
            Err(NetworkError::InvalidPayload("empty payload".into()))
        } else {
            Ok(items)
        }
    }
}

impl RemoteGateway for FakeGateway {
    async fn list_restaurants(&self) -> NetworkResult<Vec<Restaurant>> {
        let state = self.begin("list_restaurants".into())?;
        Self::list(&state, state.restaurants.clone())
    }

    async fn list_reviews(&self) -> NetworkResult<Vec<Review>> {
        let state = self.begin("list_reviews".into())?;
        Self::list(&state, state.reviews.clone())
    }

    async fn list_reviews_for_restaurant(&self, restaurant_id: i64) -> NetworkResult<Vec<Review>> {
        let state = self.begin(format!("list_reviews_for_restaurant {restaurant_id}"))?;
        let reviews = state
            .reviews
            .iter()
            .filter(|review| review.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        Self::list(&state, reviews)
    }

    async fn create_review(&self, review: &NewReview) -> NetworkResult<Review> {
        let mut state = self.begin(format!("create_review {}", review.comments))?;
        if let Some(status) = state.failing_comments.get(&review.comments) {
            return Err(NetworkError::from_status(*status, "forced failure"));
        }

        state.next_review_id += 1;
        let stored = Review {
            id: state.next_review_id,
            restaurant_id: review.restaurant_id,
            name: review.name.clone(),
            rating: review.rating,
            comments: review.comments.clone(),
            created_at: Some(5_000_000),
            updated_at: Some(5_000_000),
        };
        state.reviews.push(stored.clone());
        Ok(stored)
    }

    async fn set_favorite(
        &self,
        restaurant_id: i64,
        is_favorite: bool,
    ) -> NetworkResult<Restaurant> {
        let mut state = self.begin(format!("set_favorite {restaurant_id} {is_favorite}"))?;
        if state.failing_favorites.contains(&restaurant_id)
            || state.failing_toggles.contains(&(restaurant_id, is_favorite))
        {
            return Err(NetworkError::from_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                "forced failure",
            ));
        }

        let restaurant = state
            .restaurants
            .iter_mut()
            .find(|restaurant| restaurant.id == restaurant_id)
            .ok_or_else(|| NetworkError::from_status(StatusCode::NOT_FOUND, ""))?;
        restaurant.is_favorite = is_favorite;
        Ok(restaurant.clone())
    }
}
