//! Chat handle rows — external Telegram identifiers bound to principals.

use attesta_core::Result;

use crate::Store;


impl Store {
    /// Whether this external chat id already went through registration.
    pub async fn chat_registered(&self, chat_id: i64) -> Result<bool> {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM chat_handles WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(existing.is_some())
    }

    /// Look up a handle row by external chat id, creating it if absent.
    /// Keeps one row per chat no matter how many registrations touch it.
    pub async fn find_or_create_handle(&self, chat_id: i64) -> Result<i64> {
        if let Some(id) = sqlx::query_scalar::<_, i64>("SELECT id FROM chat_handles WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(id);
        }
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO chat_handles (chat_id) VALUES ($1) RETURNING id",
        )
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
