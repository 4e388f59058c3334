use std::collections::HashMap;

use munchy_core::domain::menu::MenuItem;
use munchy_core::domain::order::{Order, OrderId, OrderStatus};
use munchy_core::domain::restaurant::{Restaurant, RestaurantId};
use munchy_core::Catalog;

use super::RepositoryError;
use crate::DbPool;

/// Loads the full restaurant/menu/order dataset into an in-memory snapshot.
/// Called once at bootstrap; matcher evaluation reads the snapshot only.
pub struct SqlCatalogRepository {
    pool: DbPool,
}

#[derive(sqlx::FromRow)]
struct RestaurantRow {
    id: String,
    name: String,
    area: String,
    cuisine: String,
    icon: String,
    rating: f64,
    delivery_time_mins: i64,
    delivery_fee: i64,
}

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    restaurant_id: String,
    name: String,
    price: i64,
    description: String,
    rating: f64,
    veg: i64,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    restaurant_name: String,
    items_json: String,
    total: i64,
    status: String,
    expected_delivery: Option<String>,
    delivery_partner: Option<String>,
    partner_phone: Option<String>,
    delivered_at: Option<String>,
    refund_status: Option<String>,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn load_snapshot(&self) -> Result<Catalog, RepositoryError> {
        let restaurant_rows = sqlx::query_as::<_, RestaurantRow>(
            "SELECT id, name, area, cuisine, icon, rating, delivery_time_mins, delivery_fee \
             FROM restaurant ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let menu_rows = sqlx::query_as::<_, MenuItemRow>(
            "SELECT restaurant_id, name, price, description, rating, veg \
             FROM menu_item ORDER BY restaurant_id, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let order_rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, restaurant_name, items_json, total, status, expected_delivery, \
                    delivery_partner, partner_phone, delivered_at, refund_status \
             FROM customer_order ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let restaurants = restaurant_rows
            .into_iter()
            .map(|row| Restaurant {
                id: RestaurantId(row.id),
                name: row.name,
                area: row.area,
                cuisine: row.cuisine,
                icon: row.icon,
                rating: row.rating,
                delivery_time_mins: row.delivery_time_mins.max(0) as u32,
                delivery_fee: row.delivery_fee.max(0) as u32,
            })
            .collect();

        let mut menus: HashMap<String, Vec<MenuItem>> = HashMap::new();
        for row in menu_rows {
            menus.entry(row.restaurant_id).or_default().push(MenuItem {
                name: row.name,
                price: row.price.max(0) as u32,
                description: row.description,
                rating: row.rating,
                veg: row.veg != 0,
            });
        }

        let orders = order_rows
            .into_iter()
            .map(|row| {
                let items: Vec<String> = serde_json::from_str(&row.items_json)
                    .map_err(|error| RepositoryError::Decode(error.to_string()))?;
                Ok(Order {
                    id: OrderId(row.id),
                    restaurant: row.restaurant_name,
                    items,
                    total: row.total.max(0) as u32,
                    status: OrderStatus::parse(&row.status),
                    expected_delivery: row.expected_delivery,
                    delivery_partner: row.delivery_partner,
                    partner_phone: row.partner_phone,
                    delivered_at: row.delivered_at,
                    refund_status: row.refund_status,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Catalog::new(restaurants, menus, orders))
    }
}
