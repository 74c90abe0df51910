//! Remote gateway for the restaurant service.
//!
//! One call per logical operation, each returning parsed data on a 2xx
//! answer and a [`NetworkError`] otherwise. No caching and no retries here.

mod client;
mod error;

pub use client::HttpGateway;
pub use error::{NetworkError, NetworkResult};

use crate::models::{NewReview, Restaurant, Review};

/// Typed request/response contract of the remote service
#[allow(async_fn_in_trait)]
pub trait RemoteGateway {
    /// `GET /restaurants`
    async fn list_restaurants(&self) -> NetworkResult<Vec<Restaurant>>;

    /// `GET /reviews`
    async fn list_reviews(&self) -> NetworkResult<Vec<Review>>;

    /// `GET /reviews?restaurant_id={id}`
    async fn list_reviews_for_restaurant(&self, restaurant_id: i64) -> NetworkResult<Vec<Review>>;

    /// `POST /reviews`, answering with the stored review
    async fn create_review(&self, review: &NewReview) -> NetworkResult<Review>;

    /// `PUT /restaurants/{id}?is_favorite={bool}`, answering with the updated restaurant
    async fn set_favorite(&self, restaurant_id: i64, is_favorite: bool)
        -> NetworkResult<Restaurant>;
}
