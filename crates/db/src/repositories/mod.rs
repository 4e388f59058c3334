use async_trait::async_trait;
use thiserror::Error;

use munchy_core::domain::session::ConversationRecord;

pub mod catalog;
pub mod conversation;
pub mod memory;

pub use catalog::SqlCatalogRepository;
pub use conversation::SqlConversationRepository;
pub use memory::InMemoryConversationRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Durable sink for completed resolutions. Implementations must be safe to
/// call from a spawned task after the HTTP response has already been sent.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn append(&self, record: &ConversationRecord) -> Result<(), RepositoryError>;

    /// Most recent records for a session, oldest first, capped at `limit`.
    async fn recent(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<ConversationRecord>, RepositoryError>;
}
