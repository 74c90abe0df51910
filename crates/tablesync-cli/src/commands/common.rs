use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tablesync_core::cache::queries::filter_value;
use tablesync_core::queue::merge::favorite_status;
use tablesync_core::{
    ClientConfig, ConnectivityFlag, Error, FavoriteStatus, HttpGateway, OfflineQueue,
    PendingFavorite, PendingReview, ReadThroughCache, Restaurant, ReviewEntry, StoreService,
    Synchronizer,
};

use crate::error::CliError;

/// Components shared by every command
pub struct App {
    pub config: ClientConfig,
    pub offline: bool,
    pub gateway: Arc<HttpGateway>,
    pub store: Option<StoreService>,
    pub cache: ReadThroughCache<HttpGateway>,
    pub queue: OfflineQueue<HttpGateway, ConnectivityFlag>,
}

impl App {
    /// Wire the components together from one configuration.
    ///
    /// A store that cannot be opened is reported once and the app continues
    /// remote-only.
    pub async fn open(config: ClientConfig, offline: bool) -> Result<Self, CliError> {
        let gateway = Arc::new(HttpGateway::new(config.api_base_url.clone())?);

        let store = match StoreService::open_path(&config.store_path, config.store_version).await
        {
            Ok(store) => Some(store),
            Err(Error::StoreUnavailable(reason)) => {
                tracing::warn!("Local store unavailable, continuing without offline support: {reason}");
                None
            }
            Err(error) => return Err(error.into()),
        };

        let cache = ReadThroughCache::new(Arc::clone(&gateway), store.clone());
        let queue = OfflineQueue::new(
            Arc::clone(&gateway),
            store.clone(),
            ConnectivityFlag::new(!offline),
        );

        Ok(Self {
            config,
            offline,
            gateway,
            store,
            cache,
            queue,
        })
    }

    pub fn synchronizer(&self) -> Result<Synchronizer<HttpGateway>, CliError> {
        let store = self.store.clone().ok_or(CliError::NoLocalStore)?;
        Ok(Synchronizer::new(Arc::clone(&self.gateway), store))
    }
}

/// Environment configuration with command-line overrides applied on top.
pub fn resolve_config(
    api_url: Option<String>,
    db_path: Option<PathBuf>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = api_url {
        config = config.with_api_base_url(api_url)?;
    }
    if let Some(db_path) = db_path {
        config = config.with_store_path(db_path);
    }
    Ok(config)
}

/// A restaurant together with its favorite flag after queued toggles
#[derive(Debug, Clone, Copy)]
pub struct ListedRestaurant<'a> {
    pub restaurant: &'a Restaurant,
    pub favorite: FavoriteStatus,
}

pub fn with_favorite_status<'a>(
    restaurants: &'a [Restaurant],
    pending: &[PendingFavorite],
) -> Vec<ListedRestaurant<'a>> {
    restaurants
        .iter()
        .map(|restaurant| ListedRestaurant {
            restaurant,
            favorite: favorite_status(restaurant.id, Some(restaurant), pending),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct RestaurantItem<'a> {
    #[serde(flatten)]
    pub restaurant: &'a Restaurant,
    pub favorite: FavoriteStatus,
    pub page_url: String,
    pub image_url: String,
}

pub fn restaurant_to_item(listed: ListedRestaurant<'_>) -> RestaurantItem<'_> {
    RestaurantItem {
        restaurant: listed.restaurant,
        favorite: listed.favorite,
        page_url: listed.restaurant.page_url(),
        image_url: listed.restaurant.image_url(),
    }
}

#[derive(Debug, Serialize)]
pub struct PendingItems<'a> {
    pub reviews: &'a [PendingReview],
    pub favorites: &'a [PendingFavorite],
}

pub fn normalize_filter(value: Option<&str>) -> Option<&str> {
    value.and_then(filter_value)
}

pub fn normalize_comments(parts: &[String]) -> Result<String, CliError> {
    let joined = parts.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyComments)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn format_restaurant_lines(restaurants: &[ListedRestaurant<'_>]) -> Vec<String> {
    restaurants
        .iter()
        .map(|&ListedRestaurant { restaurant, favorite }| {
            let marker = match (favorite.is_favorite, favorite.pending) {
                (true, false) => "*",
                (true, true) => "+",
                (false, _) => " ",
            };
            let name = truncate(&restaurant.name, 28);
            format!(
                "{:>4} {marker} {name:<28}  {:<12}  {}",
                restaurant.id, restaurant.cuisine_type, restaurant.neighborhood
            )
        })
        .collect()
}

pub fn format_restaurant_details(restaurant: &Restaurant, status: &FavoriteStatus) -> Vec<String> {
    let favorite = match (status.is_favorite, status.pending) {
        (true, false) => "yes",
        (false, false) => "no",
        (true, true) => "yes (not synced yet)",
        (false, true) => "no (not synced yet)",
    };

    let mut lines = vec![
        format!("{} (#{})", restaurant.name, restaurant.id),
        format!("  Cuisine:      {}", restaurant.cuisine_type),
        format!("  Neighborhood: {}", restaurant.neighborhood),
        format!("  Address:      {}", restaurant.address),
        format!("  Favorite:     {favorite}"),
        format!("  Page:         {}", restaurant.page_url()),
        format!("  Image:        {}", restaurant.image_url()),
    ];
    if !restaurant.operating_hours.is_empty() {
        lines.push("  Hours:".to_string());
        lines.extend(
            restaurant
                .operating_hours
                .iter()
                .map(|(day, hours)| format!("    {day:<10} {hours}")),
        );
    }
    lines
}

pub fn format_review_lines(entries: &[ReviewEntry], now_ms: i64) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| {
            let when = entry
                .created_at()
                .map(|created_at| format_relative_time(created_at, now_ms))
                .unwrap_or_default();
            let state = if entry.is_pending() { "  [pending]" } else { "" };
            [
                format!(
                    "{}  {}  {when}{state}",
                    render_stars(entry.rating()),
                    entry.name()
                ),
                format!("    {}", entry.comments()),
            ]
        })
        .collect()
}

pub fn format_pending_lines(reviews: &[PendingReview], favorites: &[PendingFavorite]) -> Vec<String> {
    let reviews = reviews.iter().map(|pending| {
        format!(
            "{}  review    restaurant={}  {} {}",
            format_timestamp(pending.created_at),
            pending.review.restaurant_id,
            render_stars(pending.review.rating),
            truncate(&pending.review.comments, 40)
        )
    });
    let favorites = favorites.iter().map(|pending| {
        format!(
            "{}  favorite  restaurant={}  {}",
            format_timestamp(pending.created_at),
            pending.restaurant_id,
            if pending.checked { "on" } else { "off" }
        )
    });
    reviews.chain(favorites).collect()
}

pub fn render_stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut truncated = collapsed
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
