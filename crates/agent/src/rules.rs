//! Ordered deterministic matchers over the raw message text.
//!
//! Matchers run in a fixed priority order and the first match wins. The
//! order is part of the contract: "track my pizza order" carries both an
//! order-tracking cue and a cuisine word, and must resolve as order intent.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use munchy_core::catalog::QUICK_DELIVERY_THRESHOLD_MINS;
use munchy_core::Catalog;

use crate::cache::normalize;
use crate::replies;

/// Strict order-id shape: `ORD` followed by exactly six digits.
static ORDER_ID_STRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ORD\d{6}").expect("valid order id pattern"));

/// Loose order-id shape: `ORD` followed by one or more digits. Accepted only
/// after an order-intent keyword already fired; it admits ids the strict
/// pattern rejects, so the two must stay separate.
static ORDER_ID_LOOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ORD\d+").expect("valid loose order id pattern"));

/// Canned courtesy replies, checked first. Ordered pairs: the normalized
/// message matches on equality or prefix, and earlier entries win.
const CANNED_REPLIES: &[(&str, &str)] = &[
    ("hi", "👋 Hello! How can I help you today?"),
    ("hello", "👋 Hi there! What would you like to know?"),
    (
        "help",
        "I can help you with:\n• 📦 Order tracking\n• 🍴 Restaurant search\n• 📋 Menu viewing\n• 💰 Refunds",
    ),
    ("thanks", "😊 You're welcome! Anything else I can help with?"),
    ("thank you", "😊 Happy to help! Let me know if you need anything else."),
    ("bye", "👋 Goodbye! Have a great day!"),
];

const ORDER_INTENT_WORDS: &[&str] = &["track", "order", "status", "where"];

const CUISINE_TERMS: &[&str] = &[
    "pizza",
    "burger",
    "biryani",
    "dosa",
    "chinese",
    "north indian",
    "south indian",
    "fast food",
];

const FOOD_INTENT_WORDS: &[&str] = &["restaurant", "food", "eat", "hungry", "order food"];

const GENERIC_FOOD_QUERY: &str = "restaurant";

/// Restaurant keywords recognized inside a menu request, with the display
/// names used by the picker prompt.
const MENU_RESTAURANT_KEYWORDS: &[(&str, &str)] = &[
    ("domino", "Domino's Pizza"),
    ("burger king", "Burger King"),
    ("biryani", "Biryani Blues"),
    ("kfc", "KFC"),
    ("udupi", "Udupi Garden"),
    ("punjabi", "Punjabi Rasoi"),
];

const RECOMMEND_WORDS: &[&str] = &["popular", "best", "recommend", "suggest", "top"];

const URGENCY_WORDS: &[&str] = &["quick", "fast", "urgent", "asap"];

const PAYMENT_WORDS: &[&str] = &["refund", "payment", "money", "paid", "charge"];

const COMPLAINT_WORDS: &[&str] = &["complaint", "issue", "problem", "wrong", "late", "cold"];

/// Per-matcher result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    NoMatch,
    Matched(String),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

pub struct RuleEngine {
    catalog: Arc<Catalog>,
    support_phone: String,
}

impl RuleEngine {
    pub fn new(catalog: Arc<Catalog>, support_phone: impl Into<String>) -> Self {
        Self { catalog, support_phone: support_phone.into() }
    }

    /// Run the matchers in priority order. Never errors: malformed input
    /// falls through to `NoMatch`, gateway misses render as templates.
    pub fn evaluate(&self, message: &str) -> MatchOutcome {
        let normalized = normalize(message);
        let upper = message.to_uppercase();

        // 1. Canned courtesy replies.
        for (key, template) in CANNED_REPLIES {
            if normalized == *key || normalized.starts_with(key) {
                return MatchOutcome::Matched((*template).to_string());
            }
        }

        // 2. Explicit order id.
        if let Some(found) = ORDER_ID_STRICT.find(&upper) {
            return MatchOutcome::Matched(self.order_reply(found.as_str()));
        }

        // 3. Order intent without a strict id.
        if contains_any(&normalized, ORDER_INTENT_WORDS) {
            if upper.contains("ORD") {
                if let Some(found) = ORDER_ID_LOOSE.find(&upper) {
                    return MatchOutcome::Matched(self.order_reply(found.as_str()));
                }
            }
            return MatchOutcome::Matched(replies::ask_for_order_id());
        }

        // 4. Cuisine keywords.
        for term in CUISINE_TERMS {
            if normalized.contains(term) {
                return MatchOutcome::Matched(self.search_reply(term));
            }
        }

        // 5. Generic food intent.
        if contains_any(&normalized, FOOD_INTENT_WORDS) {
            return MatchOutcome::Matched(self.search_reply(GENERIC_FOOD_QUERY));
        }

        // 6. Menu intent.
        if normalized.contains("menu") {
            for (keyword, _) in MENU_RESTAURANT_KEYWORDS {
                if normalized.contains(keyword) {
                    return MatchOutcome::Matched(self.menu_reply(keyword));
                }
            }
            let known_names: Vec<&str> =
                MENU_RESTAURANT_KEYWORDS.iter().map(|(_, display)| *display).collect();
            return MatchOutcome::Matched(replies::menu_picker(&known_names));
        }

        // 7. Recommendations.
        if contains_any(&normalized, RECOMMEND_WORDS) {
            return MatchOutcome::Matched(replies::popular_list(
                &self.catalog.popular_restaurants(),
            ));
        }

        // 8. Urgency.
        if contains_any(&normalized, URGENCY_WORDS) {
            return MatchOutcome::Matched(replies::quick_list(
                &self.catalog.quick_delivery_restaurants(QUICK_DELIVERY_THRESHOLD_MINS),
            ));
        }

        // 9. Payments and refunds.
        if contains_any(&normalized, PAYMENT_WORDS) {
            return MatchOutcome::Matched(replies::refund_help());
        }

        // 10. Complaints.
        if contains_any(&normalized, COMPLAINT_WORDS) {
            return MatchOutcome::Matched(replies::complaint_help(&self.support_phone));
        }

        MatchOutcome::NoMatch
    }

    fn order_reply(&self, order_id: &str) -> String {
        match self.catalog.get_order(order_id) {
            Some(order) => replies::order_status(order),
            None => replies::order_not_found(order_id),
        }
    }

    fn search_reply(&self, query: &str) -> String {
        let results = self.catalog.search_restaurants(query);
        let popular = self.catalog.popular_restaurants();
        replies::search_results(query, &results, &popular)
    }

    fn menu_reply(&self, keyword: &str) -> String {
        let Some(restaurant) = self.catalog.restaurant_by_name(keyword) else {
            return replies::restaurant_not_found(keyword);
        };

        let items = self.catalog.menu_for(&restaurant.id.0);
        if items.is_empty() {
            return replies::menu_unavailable(&restaurant.name);
        }
        replies::menu(restaurant, items)
    }
}

fn contains_any(normalized: &str, words: &[&str]) -> bool {
    words.iter().any(|word| normalized.contains(word))
}
