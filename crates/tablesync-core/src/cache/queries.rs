//! Derived restaurant queries.
//!
//! Pure filters over an already fetched list. Results keep the order of the
//! source list; the distinct queries keep first occurrences.

use std::collections::HashSet;

use crate::models::Restaurant;

/// Restaurants matching both filters; `None` matches everything.
pub fn by_cuisine_and_neighborhood(
    restaurants: &[Restaurant],
    cuisine: Option<&str>,
    neighborhood: Option<&str>,
) -> Vec<Restaurant> {
    restaurants
        .iter()
        .filter(|r| cuisine.is_none_or(|cuisine| r.cuisine_type == cuisine))
        .filter(|r| neighborhood.is_none_or(|neighborhood| r.neighborhood == neighborhood))
        .cloned()
        .collect()
}

/// Neighborhoods in first-seen order, without duplicates.
pub fn distinct_neighborhoods(restaurants: &[Restaurant]) -> Vec<String> {
    distinct(restaurants.iter().map(|r| r.neighborhood.as_str()))
}

/// Cuisine types in first-seen order, without duplicates.
pub fn distinct_cuisines(restaurants: &[Restaurant]) -> Vec<String> {
    distinct(restaurants.iter().map(|r| r.cuisine_type.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

/// Map the conventional `"all"` wildcard (and blanks) to no filter.
pub fn filter_value(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value)
    }
}
