use std::sync::Mutex;

use async_trait::async_trait;

use munchy_core::domain::session::ConversationRecord;

use super::{ConversationRepository, RepositoryError};

/// In-memory conversation sink for tests and offline tooling.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    records: Mutex<Vec<ConversationRecord>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn append(&self, record: &ConversationRecord) -> Result<(), RepositoryError> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
        Ok(())
    }

    async fn recent(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<ConversationRecord>, RepositoryError> {
        let records = self.records.lock().map(|records| {
            records
                .iter()
                .filter(|record| record.session_id == session_id)
                .cloned()
                .collect::<Vec<_>>()
        });

        let mut records = records.unwrap_or_default();
        let keep_from = records.len().saturating_sub(limit as usize);
        Ok(records.split_off(keep_from))
    }
}
