use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub price: u32,
    pub description: String,
    pub rating: f64,
    pub veg: bool,
}
