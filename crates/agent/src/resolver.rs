use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use munchy_core::domain::session::{ConversationRecord, Turn};

use crate::cache::{normalize, ResponseCache};
use crate::llm::{build_prompt, LlmClient};
use crate::replies;
use crate::rules::{MatchOutcome, RuleEngine};
use crate::session::SessionStore;

/// Which layer produced the reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedVia {
    Rules,
    Cache,
    Generator,
    /// The generator failed and the fixed apology template was used.
    Apology,
}

#[derive(Clone, Debug)]
pub struct Resolution {
    pub reply: String,
    pub session_id: String,
    pub via: ResolvedVia,
    pub timestamp: DateTime<Utc>,
    pub elapsed: Duration,
}

impl Resolution {
    /// Row for the durable conversation log.
    pub fn record(&self, user_message: &str) -> ConversationRecord {
        ConversationRecord {
            session_id: self.session_id.clone(),
            user_message: user_message.to_string(),
            bot_response: self.reply.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Composes rule engine, response cache, fallback generator, and session
/// store into the single entry point `resolve`. All state is injected at
/// construction; there are no ambient singletons.
pub struct Resolver {
    rules: RuleEngine,
    cache: ResponseCache,
    sessions: SessionStore,
    llm: Arc<dyn LlmClient>,
    default_session_id: String,
}

impl Resolver {
    pub fn new(
        rules: RuleEngine,
        cache: ResponseCache,
        sessions: SessionStore,
        llm: Arc<dyn LlmClient>,
        default_session_id: impl Into<String>,
    ) -> Self {
        Self { rules, cache, sessions, llm, default_session_id: default_session_id.into() }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Resolve a message to a reply. Infallible: rule and lookup misses
    /// render as templates, and a generator failure degrades to the apology
    /// template.
    pub async fn resolve(&self, message: &str, session_id: Option<&str>) -> Resolution {
        let started = Instant::now();
        let correlation_id = Uuid::new_v4().to_string();
        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.default_session_id)
            .to_string();

        self.sessions.append(&session_id, Turn::user(message));

        let (reply, via) = self.resolve_reply(message, &session_id, &correlation_id).await;

        self.sessions.append(&session_id, Turn::agent(reply.clone()));

        Resolution {
            reply,
            session_id,
            via,
            timestamp: Utc::now(),
            elapsed: started.elapsed(),
        }
    }

    async fn resolve_reply(
        &self,
        message: &str,
        session_id: &str,
        correlation_id: &str,
    ) -> (String, ResolvedVia) {
        if let MatchOutcome::Matched(reply) = self.rules.evaluate(message) {
            tracing::debug!(
                event_name = "chat.resolve.rule_match",
                correlation_id,
                session_id,
                "resolved by rule engine"
            );
            return (reply, ResolvedVia::Rules);
        }

        let cache_key = normalize(message);
        if let Some(reply) = self.cache.get(&cache_key) {
            tracing::debug!(
                event_name = "chat.resolve.cache_hit",
                correlation_id,
                session_id,
                "resolved from response cache"
            );
            return (reply, ResolvedVia::Cache);
        }

        let prompt = build_prompt(message);
        match self.llm.complete(&prompt).await {
            Ok(reply) => {
                self.cache.insert(cache_key, reply.clone());
                tracing::info!(
                    event_name = "chat.resolve.generated",
                    correlation_id,
                    session_id,
                    "resolved by fallback generator"
                );
                (reply, ResolvedVia::Generator)
            }
            Err(error) => {
                tracing::error!(
                    event_name = "chat.resolve.generator_error",
                    correlation_id,
                    session_id,
                    error = %error,
                    "fallback generator failed; replying with apology template"
                );
                (replies::apology(), ResolvedVia::Apology)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use munchy_core::domain::menu::MenuItem;
    use munchy_core::domain::order::{Order, OrderId, OrderStatus};
    use munchy_core::domain::restaurant::{Restaurant, RestaurantId};
    use munchy_core::domain::session::Role;
    use munchy_core::Catalog;

    use crate::cache::ResponseCache;
    use crate::llm::{LlmClient, LlmError};
    use crate::rules::RuleEngine;
    use crate::session::SessionStore;

    use super::{ResolvedVia, Resolver};

    struct CountingLlm {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingLlm {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), fail: false })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), fail: true })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for CountingLlm {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(LlmError::EmptyCompletion);
            }
            Ok(format!("generated reply #{call} for: {prompt}"))
        }

        async fn ensure_available(&self) -> Result<(), LlmError> {
            Ok(())
        }
    }

    fn restaurant(id: &str, name: &str, cuisine: &str, rating: f64, mins: u32) -> Restaurant {
        Restaurant {
            id: RestaurantId(id.to_string()),
            name: name.to_string(),
            area: "Koramangala".to_string(),
            cuisine: cuisine.to_string(),
            icon: "🍴".to_string(),
            rating,
            delivery_time_mins: mins,
            delivery_fee: 30,
        }
    }

    fn catalog_fixture() -> Arc<Catalog> {
        let restaurants = vec![
            restaurant("rest-001", "Domino's Pizza", "Pizza, Fast Food", 4.5, 25),
            restaurant("rest-003", "Biryani Blues", "Biryani, North Indian", 4.6, 35),
        ];

        let mut menus = HashMap::new();
        menus.insert(
            "rest-001".to_string(),
            vec![MenuItem {
                name: "Margherita Pizza".to_string(),
                price: 199,
                description: "Classic cheese pizza".to_string(),
                rating: 4.5,
                veg: true,
            }],
        );

        let orders = vec![Order {
            id: OrderId("ORD100000".to_string()),
            restaurant: "Domino's Pizza".to_string(),
            items: vec!["Margherita Pizza".to_string()],
            total: 450,
            status: OrderStatus::Delivered,
            expected_delivery: None,
            delivery_partner: None,
            partner_phone: None,
            delivered_at: Some("7:45 PM".to_string()),
            refund_status: None,
        }];

        Arc::new(Catalog::new(restaurants, menus, orders))
    }

    fn resolver_with(llm: Arc<CountingLlm>) -> Resolver {
        Resolver::new(
            RuleEngine::new(catalog_fixture(), "1800-1234-5678"),
            ResponseCache::new(),
            SessionStore::new(20),
            llm,
            "default",
        )
    }

    #[tokio::test]
    async fn canned_reply_is_independent_of_session_history() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm.clone());

        let first = resolver.resolve("hi", Some("s1")).await;
        resolver.resolve("tell me something unusual", Some("s1")).await;
        let second = resolver.resolve("hi", Some("s1")).await;

        assert_eq!(first.reply, second.reply);
        assert_eq!(second.via, ResolvedVia::Rules);
    }

    #[tokio::test]
    async fn known_order_reply_carries_status_restaurant_and_total() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm.clone());

        let resolution = resolver.resolve("status of ORD100000 please", None).await;

        assert_eq!(resolution.via, ResolvedVia::Rules);
        assert!(resolution.reply.contains("DELIVERED"));
        assert!(resolution.reply.contains("Domino's Pizza"));
        assert!(resolution.reply.contains("₹450"));
        assert!(resolution.reply.contains("Delivered at 7:45 PM"));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_order_reply_has_no_real_order_data() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm);

        let resolution = resolver.resolve("ORD999999", None).await;

        assert!(resolution.reply.contains("not found"));
        assert!(resolution.reply.contains("ORD999999"));
        assert!(!resolution.reply.contains("Domino's Pizza"));
    }

    #[tokio::test]
    async fn repeated_fallback_is_served_from_cache_byte_identical() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm.clone());

        let first = resolver.resolve("do you deliver to the moon?", Some("s1")).await;
        let second = resolver.resolve("do you deliver to the moon?", Some("s2")).await;

        assert_eq!(first.via, ResolvedVia::Generator);
        assert_eq!(second.via, ResolvedVia::Cache);
        assert_eq!(first.reply, second.reply);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn cache_key_normalization_folds_case_and_whitespace() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm.clone());

        let first = resolver.resolve("Do You Deliver Flowers?", None).await;
        let second = resolver.resolve("  do you deliver flowers?  ", None).await;

        assert_eq!(first.reply, second.reply);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn session_history_never_exceeds_the_cap() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm);

        // Each resolve appends two turns; 15 resolutions would reach 30.
        for n in 0..15 {
            resolver.resolve(&format!("hi there {n}"), Some("s1")).await;
        }

        let turns = resolver.sessions().history("s1");
        assert_eq!(turns.len(), 20);
        // Oldest surviving turn is a user turn from the sixth resolution.
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "hi there 5");
        assert_eq!(turns[19].role, Role::Agent);
    }

    #[tokio::test]
    async fn rule_priority_routes_track_my_pizza_order_to_order_intent() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm.clone());

        let resolution = resolver.resolve("track my pizza order", None).await;

        assert_eq!(resolution.via, ResolvedVia::Rules);
        assert!(resolution.reply.contains("Please provide order ID"));
        assert!(!resolution.reply.contains("Found"));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn case_and_whitespace_variants_of_greeting_get_same_canned_reply() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm);

        let first = resolver.resolve("Hello", None).await;
        let second = resolver.resolve("  hello  ", None).await;

        assert_eq!(first.reply, second.reply);
        assert_eq!(first.via, ResolvedVia::Rules);
    }

    #[tokio::test]
    async fn end_to_end_order_then_greeting_grows_session_to_four_turns() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm);

        let order_resolution = resolver.resolve("ORD100000 status", Some("s1")).await;
        assert!(order_resolution.reply.contains("DELIVERED"));
        assert!(order_resolution.reply.contains("Domino's Pizza"));

        resolver.resolve("hi", Some("s1")).await;

        let turns = resolver.sessions().history("s1");
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].text, "ORD100000 status");
        assert_eq!(turns[2].text, "hi");
    }

    #[tokio::test]
    async fn missing_session_id_falls_back_to_default() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm);

        resolver.resolve("hi", None).await;
        resolver.resolve("hi", Some("   ")).await;

        assert_eq!(resolver.sessions().history("default").len(), 4);
    }

    #[tokio::test]
    async fn generator_failure_degrades_to_apology_and_is_not_cached() {
        let llm = CountingLlm::failing();
        let resolver = resolver_with(llm.clone());

        let first = resolver.resolve("do you sell gift cards?", Some("s1")).await;
        assert_eq!(first.via, ResolvedVia::Apology);
        assert!(first.reply.contains("Sorry"));
        assert!(resolver.cache().is_empty());

        // The failure was not memoized: the generator is consulted again.
        let second = resolver.resolve("do you sell gift cards?", Some("s1")).await;
        assert_eq!(second.via, ResolvedVia::Apology);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn resolution_record_carries_session_and_both_messages() {
        let llm = CountingLlm::succeeding();
        let resolver = resolver_with(llm);

        let resolution = resolver.resolve("hi", Some("s9")).await;
        let record = resolution.record("hi");

        assert_eq!(record.session_id, "s9");
        assert_eq!(record.user_message, "hi");
        assert_eq!(record.bot_response, resolution.reply);
    }
}
