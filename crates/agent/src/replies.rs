//! Customer-facing reply templates.
//!
//! Formatting contracts live here so the matchers in `rules` stay readable.
//! Lookup misses render as templated replies, never as errors.

use munchy_core::domain::menu::MenuItem;
use munchy_core::domain::order::{Order, OrderStatus};
use munchy_core::domain::restaurant::Restaurant;

const SAMPLE_ORDER_IDS: &str = "ORD100000, ORD100001, ORD100002";

fn status_emoji(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Preparing => "🍳",
        OrderStatus::OutForDelivery => "🛵",
        OrderStatus::Delivered => "✅",
        OrderStatus::Cancelled => "❌",
        OrderStatus::Unknown => "📦",
    }
}

pub fn order_status(order: &Order) -> String {
    let mut reply = format!("{} **Order {}**\n\n", status_emoji(order.status), order.id.0);
    reply.push_str(&format!("Restaurant: {}\n", order.restaurant));
    reply.push_str(&format!("Items: {}\n", order.items.join(", ")));
    reply.push_str(&format!("Total: ₹{}\n", order.total));
    reply.push_str(&format!("Status: **{}**\n", order.status.label()));

    match order.status {
        OrderStatus::OutForDelivery => {
            reply.push_str(&format!(
                "\nDelivery Partner: {}",
                order.delivery_partner.as_deref().unwrap_or("Assigned")
            ));
            reply.push_str(&format!(
                "\n📞 {}",
                order.partner_phone.as_deref().unwrap_or("Updating...")
            ));
        }
        OrderStatus::Delivered => {
            reply.push_str(&format!(
                "\n✅ Delivered at {}",
                order.delivered_at.as_deref().unwrap_or("Recently")
            ));
        }
        OrderStatus::Preparing => {
            reply.push_str(&format!(
                "\n⏱️ Expected: {}",
                order.expected_delivery.as_deref().unwrap_or("30-40 mins")
            ));
        }
        OrderStatus::Cancelled => {
            reply.push_str(&format!(
                "\n💰 Refund: {}",
                order.refund_status.as_deref().unwrap_or("Processing")
            ));
        }
        OrderStatus::Unknown => {}
    }

    reply
}

pub fn order_not_found(order_id: &str) -> String {
    format!(
        "❌ Order {order_id} not found. Please check the ID.\n\n📝 Sample IDs: {SAMPLE_ORDER_IDS}"
    )
}

pub fn ask_for_order_id() -> String {
    "Please provide order ID (e.g., ORD100000)\n\n\
     📝 Test IDs:\n\
     • ORD100000 (Delivered)\n\
     • ORD100001 (Preparing)\n\
     • ORD100002 (Out for Delivery)"
        .to_string()
}

pub fn search_results(query: &str, results: &[&Restaurant], popular: &[&Restaurant]) -> String {
    if results.is_empty() {
        let mut reply = format!("No exact match for '{query}'. Try these popular ones:\n\n");
        for restaurant in popular.iter().take(3) {
            reply.push_str(&format!(
                "🍴 **{}**\n   {}\n   ⭐ {:.1} | ⏱️ {}\n\n",
                restaurant.name,
                restaurant.cuisine,
                restaurant.rating,
                restaurant.delivery_time_label()
            ));
        }
        return reply;
    }

    let mut reply = format!("Found {} restaurant(s):\n\n", results.len());
    for restaurant in results {
        reply.push_str(&format!("🍴 **{}**\n", restaurant.name));
        reply.push_str(&format!("   📍 {}\n", restaurant.area));
        reply.push_str(&format!("   🍽️ {}\n", restaurant.cuisine));
        reply.push_str(&format!(
            "   ⭐ {:.1} | ⏱️ {} | 💵 ₹{}\n\n",
            restaurant.rating,
            restaurant.delivery_time_label(),
            restaurant.delivery_fee
        ));
    }
    reply
}

pub fn menu(restaurant: &Restaurant, items: &[MenuItem]) -> String {
    let mut reply = format!("📋 **{} Menu**\n\n", restaurant.name);
    for item in items {
        let marker = if item.veg { "🟢" } else { "🔴" };
        reply.push_str(&format!("{marker} **{}** - ₹{}\n", item.name, item.price));
        reply.push_str(&format!("   {} | ⭐ {:.1}\n\n", item.description, item.rating));
    }
    reply
}

pub fn restaurant_not_found(name: &str) -> String {
    format!("Restaurant '{name}' not found.")
}

pub fn menu_unavailable(restaurant_name: &str) -> String {
    format!("Menu not available for {restaurant_name}.")
}

pub fn menu_picker(restaurant_names: &[&str]) -> String {
    let mut reply = "Which restaurant's menu?".to_string();
    for name in restaurant_names {
        reply.push_str(&format!("\n• {name}"));
    }
    reply
}

pub fn popular_list(restaurants: &[&Restaurant]) -> String {
    let mut reply = "🌟 **Top Rated Restaurants:**\n\n".to_string();
    for restaurant in restaurants {
        reply.push_str(&format!(
            "{} **{}** - ⭐ {:.1}\n   {} | {}\n\n",
            restaurant.icon,
            restaurant.name,
            restaurant.rating,
            restaurant.cuisine,
            restaurant.delivery_time_label()
        ));
    }
    reply
}

pub fn quick_list(restaurants: &[&Restaurant]) -> String {
    let mut reply = "⚡ **Quick Delivery (Under 30 mins):**\n\n".to_string();
    for restaurant in restaurants.iter().take(3) {
        reply.push_str(&format!(
            "{} {} - {}\n",
            restaurant.icon,
            restaurant.name,
            restaurant.delivery_time_label()
        ));
    }
    reply
}

pub fn refund_help() -> String {
    "💰 **Refund Help:**\n\n\
     To process refund:\n\
     1. Provide order ID\n\
     2. Reason for refund\n\
     3. Refunds take 2-3 business days\n\n\
     Need help with specific order?"
        .to_string()
}

pub fn complaint_help(support_phone: &str) -> String {
    format!(
        "⚠️ **Report an Issue:**\n\n\
         I'm here to help! Please:\n\
         1. Share your order ID\n\
         2. Describe the issue\n\
         3. I'll connect you with support\n\n\
         Or contact: {support_phone}"
    )
}

/// Shown when the fallback generator fails mid-request. Never cached.
pub fn apology() -> String {
    "😔 Sorry, I'm having trouble answering that right now. Please try again in a moment."
        .to_string()
}
