use tablesync_core::queue::merge::favorite_status;

use crate::commands::common::{
    format_restaurant_details, format_restaurant_lines, normalize_filter, restaurant_to_item,
    with_favorite_status, App, ListedRestaurant, RestaurantItem,
};
use crate::error::CliError;

pub async fn run_restaurants(
    app: &App,
    cuisine: Option<&str>,
    neighborhood: Option<&str>,
    favorites_only: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let cuisine = normalize_filter(cuisine);
    let neighborhood = normalize_filter(neighborhood);

    let restaurants = app
        .cache
        .restaurants_by_cuisine_and_neighborhood(cuisine, neighborhood)
        .await?;
    let pending = app.queue.pending_favorites().await?;
    let restaurants = select_favorites(with_favorite_status(&restaurants, &pending), favorites_only);

    if as_json {
        let items = restaurants
            .iter()
            .copied()
            .map(restaurant_to_item)
            .collect::<Vec<RestaurantItem<'_>>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if restaurants.is_empty() {
        println!("No restaurants found.");
        return Ok(());
    }
    for line in format_restaurant_lines(&restaurants) {
        println!("{line}");
    }
    Ok(())
}

/// Keep only favorites, judged by the flag queued toggles leave behind.
pub fn select_favorites(
    restaurants: Vec<ListedRestaurant<'_>>,
    favorites_only: bool,
) -> Vec<ListedRestaurant<'_>> {
    if !favorites_only {
        return restaurants;
    }
    restaurants
        .into_iter()
        .filter(|listed| listed.favorite.is_favorite)
        .collect()
}

pub async fn run_restaurant(app: &App, id: i64, as_json: bool) -> Result<(), CliError> {
    let restaurant = app.cache.restaurant_by_id(id).await?;
    let pending = app.queue.pending_favorites().await?;
    let status = favorite_status(id, Some(&restaurant), &pending);

    if as_json {
        let item = restaurant_to_item(ListedRestaurant {
            restaurant: &restaurant,
            favorite: status,
        });
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    for line in format_restaurant_details(&restaurant, &status) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_neighborhoods(app: &App) -> Result<(), CliError> {
    for neighborhood in app.cache.neighborhoods().await? {
        println!("{neighborhood}");
    }
    Ok(())
}

pub async fn run_cuisines(app: &App) -> Result<(), CliError> {
    for cuisine in app.cache.cuisines().await? {
        println!("{cuisine}");
    }
    Ok(())
}
