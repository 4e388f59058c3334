use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Fulfillment state as stored on the order row. Values the store does not
/// recognize parse to `Unknown` so a new backend status never breaks replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "preparing" => Self::Preparing,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Upper-cased form used in customer-facing order summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Preparing => "PREPARING",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub restaurant: String,
    pub items: Vec<String>,
    pub total: u32,
    pub status: OrderStatus,
    pub expected_delivery: Option<String>,
    pub delivery_partner: Option<String>,
    pub partner_phone: Option<String>,
    pub delivered_at: Option<String>,
    pub refund_status: Option<String>,
}
