//! Review models

use serde::{Deserialize, Serialize};

use super::wire::{i64_or_string, rating_or_string, timestamp_millis_opt};
use crate::error::{Error, Result};

/// A review confirmed by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Server-assigned identifier (primary key of the `reviews` partition)
    #[serde(deserialize_with = "i64_or_string")]
    pub id: i64,
    /// Restaurant this review belongs to (not enforced locally)
    #[serde(deserialize_with = "i64_or_string")]
    pub restaurant_id: i64,
    pub name: String,
    /// Star rating, 1 to 5
    #[serde(deserialize_with = "rating_or_string")]
    pub rating: u8,
    #[serde(default)]
    pub comments: String,
    /// Creation timestamp (unix ms)
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "timestamp_millis_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<i64>,
    /// Last update timestamp (unix ms)
    #[serde(
        rename = "updatedAt",
        default,
        deserialize_with = "timestamp_millis_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<i64>,
}

/// Review payload submitted by the user; has no server id yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub restaurant_id: i64,
    pub name: String,
    pub rating: u8,
    pub comments: String,
}

impl NewReview {
    /// Create a review payload with trimmed text fields.
    pub fn new(
        restaurant_id: i64,
        name: impl Into<String>,
        rating: u8,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            restaurant_id,
            name: name.into().trim().to_string(),
            rating,
            comments: comments.into().trim().to_string(),
        }
    }

    /// Shallow payload check; deeper validation is up to the caller.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("review name cannot be empty".into()));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(Error::Validation(format!(
                "review rating {} is outside 1..=5",
                self.rating
            )));
        }
        Ok(())
    }
}
