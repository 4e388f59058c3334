use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestaurantId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub area: String,
    pub cuisine: String,
    /// Emoji marker carried by the catalog dataset, shown in ranked listings.
    pub icon: String,
    pub rating: f64,
    pub delivery_time_mins: u32,
    pub delivery_fee: u32,
}

impl Restaurant {
    pub fn delivery_time_label(&self) -> String {
        format!("{} mins", self.delivery_time_mins)
    }
}
