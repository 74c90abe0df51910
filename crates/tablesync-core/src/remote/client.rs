//! reqwest implementation of the remote gateway.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{NetworkError, NetworkResult, RemoteGateway};
use crate::error::{Error, Result};
use crate::models::{NewReview, Restaurant, Review};
use crate::util::{is_http_url, normalize_text_option};

/// HTTP client for the restaurant service
#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(NetworkError::from)?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> NetworkResult<Response> {
        let response = request.header("Accept", "application/json").send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::from_status(status, &body));
        }

        Ok(response)
    }

    /// Send a request and decode its JSON body; a `null` body is an error.
    async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> NetworkResult<T> {
        let body = Self::send(request).await?.text().await?;
        decode_payload(&body)
    }
}

impl RemoteGateway for HttpGateway {
    async fn list_restaurants(&self) -> NetworkResult<Vec<Restaurant>> {
        Self::fetch_json(self.client.get(self.url("/restaurants"))).await
    }

    async fn list_reviews(&self) -> NetworkResult<Vec<Review>> {
        Self::fetch_json(self.client.get(self.url("/reviews"))).await
    }

    async fn list_reviews_for_restaurant(&self, restaurant_id: i64) -> NetworkResult<Vec<Review>> {
        let request = self
            .client
            .get(self.url("/reviews"))
            .query(&[("restaurant_id", restaurant_id)]);
        Self::fetch_json(request).await
    }

    async fn create_review(&self, review: &NewReview) -> NetworkResult<Review> {
        let request = self.client.post(self.url("/reviews")).json(review);
        Self::fetch_json(request).await
    }

    async fn set_favorite(
        &self,
        restaurant_id: i64,
        is_favorite: bool,
    ) -> NetworkResult<Restaurant> {
        let request = self
            .client
            .put(self.url(&format!("/restaurants/{restaurant_id}")))
            .query(&[("is_favorite", is_favorite)]);
        Self::fetch_json(request).await
    }
}

fn decode_payload<T: DeserializeOwned>(body: &str) -> NetworkResult<T> {
    let payload: Option<T> = serde_json::from_str(body)
        .map_err(|error| NetworkError::InvalidPayload(error.to_string()))?;
    payload.ok_or_else(|| NetworkError::InvalidPayload("empty payload".to_string()))
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Validation("API base URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Validation(format!(
            "API base URL must include http:// or https://: {url}"
        )))
    }
}
