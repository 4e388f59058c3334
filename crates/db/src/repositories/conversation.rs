use async_trait::async_trait;
use chrono::{DateTime, Utc};

use munchy_core::domain::session::ConversationRecord;

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    session_id: String,
    user_message: String,
    bot_response: String,
    created_at: String,
}

#[async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn append(&self, record: &ConversationRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO conversation (session_id, user_message, bot_response, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&record.session_id)
        .bind(&record.user_message)
        .bind(&record.bot_response)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<ConversationRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            "SELECT session_id, user_message, bot_response, created_at FROM conversation \
             WHERE session_id = ?1 ORDER BY id DESC LIMIT ?2",
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = rows
            .into_iter()
            .map(|row| {
                let timestamp = row
                    .created_at
                    .parse::<DateTime<Utc>>()
                    .map_err(|error| RepositoryError::Decode(error.to_string()))?;
                Ok(ConversationRecord {
                    session_id: row.session_id,
                    user_message: row.user_message,
                    bot_response: row.bot_response,
                    timestamp,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        records.reverse();
        Ok(records)
    }
}
