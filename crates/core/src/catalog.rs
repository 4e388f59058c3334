//! In-memory snapshot of the restaurant/menu/order dataset.
//!
//! The snapshot is loaded once at bootstrap and then serves every lookup the
//! rule engine makes, so matcher evaluation never blocks on I/O.

use std::collections::HashMap;

use crate::domain::menu::MenuItem;
use crate::domain::order::Order;
use crate::domain::restaurant::Restaurant;

/// Minimum rating for a restaurant to count as "popular".
pub const POPULAR_RATING_FLOOR: f64 = 4.3;

/// Delivery-time cutoff (minutes) for the quick-delivery subset.
pub const QUICK_DELIVERY_THRESHOLD_MINS: u32 = 30;

const SEARCH_RESULT_CAP: usize = 5;
const POPULAR_RESULT_CAP: usize = 3;

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
    menus: HashMap<String, Vec<MenuItem>>,
    orders: HashMap<String, Order>,
}

impl Catalog {
    pub fn new(
        restaurants: Vec<Restaurant>,
        menus: HashMap<String, Vec<MenuItem>>,
        orders: Vec<Order>,
    ) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.id.0.to_ascii_uppercase(), order))
            .collect();
        Self { restaurants, menus, orders }
    }

    pub fn restaurant_count(&self) -> usize {
        self.restaurants.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Case-insensitive substring search over restaurant name and cuisine,
    /// capped at five matches.
    pub fn search_restaurants(&self, query: &str) -> Vec<&Restaurant> {
        let query = query.to_lowercase();
        self.restaurants
            .iter()
            .filter(|restaurant| {
                restaurant.name.to_lowercase().contains(&query)
                    || restaurant.cuisine.to_lowercase().contains(&query)
            })
            .take(SEARCH_RESULT_CAP)
            .collect()
    }

    pub fn get_order(&self, id: &str) -> Option<&Order> {
        self.orders.get(&id.to_ascii_uppercase())
    }

    pub fn menu_for(&self, restaurant_id: &str) -> &[MenuItem] {
        self.menus.get(restaurant_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First restaurant whose name contains the given fragment.
    pub fn restaurant_by_name(&self, fragment: &str) -> Option<&Restaurant> {
        let fragment = fragment.to_lowercase();
        self.restaurants.iter().find(|restaurant| restaurant.name.to_lowercase().contains(&fragment))
    }

    /// Restaurants rated at or above the popularity floor, best first,
    /// capped at three.
    pub fn popular_restaurants(&self) -> Vec<&Restaurant> {
        let mut popular: Vec<&Restaurant> = self
            .restaurants
            .iter()
            .filter(|restaurant| restaurant.rating >= POPULAR_RATING_FLOOR)
            .collect();
        popular.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
        popular.truncate(POPULAR_RESULT_CAP);
        popular
    }

    pub fn quick_delivery_restaurants(&self, threshold_mins: u32) -> Vec<&Restaurant> {
        self.restaurants
            .iter()
            .filter(|restaurant| restaurant.delivery_time_mins <= threshold_mins)
            .collect()
    }
}
