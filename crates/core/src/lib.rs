pub mod catalog;
pub mod config;
pub mod domain;

pub use catalog::{Catalog, POPULAR_RATING_FLOOR, QUICK_DELIVERY_THRESHOLD_MINS};
pub use domain::menu::MenuItem;
pub use domain::order::{Order, OrderId, OrderStatus};
pub use domain::restaurant::{Restaurant, RestaurantId};
pub use domain::session::{ConversationRecord, Role, Turn};
