//! Restaurant model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::wire::{bool_or_string, i64_or_string};

/// Photograph name used for restaurants the service has no picture for.
const PLACEHOLDER_PHOTOGRAPH: &str = "undefined";

/// Geographic position of a restaurant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A restaurant as served by the remote directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Unique identifier (primary key of the `restaurants` partition)
    #[serde(deserialize_with = "i64_or_string")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub cuisine_type: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latlng: LatLng,
    /// Photograph reference, without extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photograph: Option<String>,
    /// Day name to opening hours
    #[serde(default)]
    pub operating_hours: BTreeMap<String, String>,
    /// Confirmed favorite flag
    #[serde(default, deserialize_with = "bool_or_string")]
    pub is_favorite: bool,
}

impl Restaurant {
    /// Relative URL of the restaurant detail page.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("./restaurant.html?id={}", self.id)
    }

    /// Relative URL of the restaurant photograph.
    #[must_use]
    pub fn image_url(&self) -> String {
        let photograph = self
            .photograph
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(PLACEHOLDER_PHOTOGRAPH);
        format!("/img/{photograph}.jpg")
    }
}

/// Effective favorite state presented to the UI.
///
/// A queued toggle that has not reached the server yet wins over the
/// confirmed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteStatus {
    pub restaurant_id: i64,
    pub is_favorite: bool,
    /// True when `is_favorite` comes from a queued toggle
    pub pending: bool,
}
