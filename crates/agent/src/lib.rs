//! Response resolution pipeline for the Munchy support agent.
//!
//! A free-text message is resolved through progressively more expensive
//! strategies, stopping at the first one that produces a reply:
//!
//! 1. **Rule engine** (`rules`) - ordered deterministic matchers over the
//!    message text, backed by the in-memory catalog. Microseconds.
//! 2. **Response cache** (`cache`) - memoized generator output keyed by the
//!    normalized message. Only generator replies are cached; rule replies
//!    are already O(1).
//! 3. **Fallback generator** (`llm`) - a locally hosted language model
//!    behind the `LlmClient` trait. The only path that can take longer than
//!    a few milliseconds, and the reason the two layers above exist.
//!
//! The orchestrator (`resolver`) composes the three layers and maintains a
//! bounded per-session turn history (`session`). Every failure inside the
//! pipeline degrades to a templated reply; `resolve` itself never errors.

pub mod cache;
pub mod llm;
pub mod replies;
pub mod resolver;
pub mod rules;
pub mod session;

pub use cache::{normalize, ResponseCache};
pub use llm::{LlmClient, LlmError, OllamaClient};
pub use resolver::{ResolvedVia, Resolution, Resolver};
pub use rules::{MatchOutcome, RuleEngine};
pub use session::SessionStore;
