use crate::adapters::database::DbPool;
use crate::adapters::database::records::MessageRecord;
use crate::domain::message::{Message, NewMessage};
use crate::domain::repository::MessageRepository;
use crate::error::{AppError, Result};
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct PgMessageRepository {
    pool: DbPool,
}

impl PgMessageRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, id: i64) -> Result<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, title, body, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_all(&self) -> Result<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, title, body, created_at
            FROM messages
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if records.is_empty() {
            return Err(AppError::NotFound("no records found".into()));
        }

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, message))]
    async fn create(&self, message: NewMessage) -> Result<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (title, body, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, title, body, created_at
            "#,
        )
        .bind(&message.title)
        .bind(&message.body)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    #[tracing::instrument(level = "debug", skip(self, message), fields(id = message.id))]
    async fn update(&self, message: Message) -> Result<Message> {
        sqlx::query("UPDATE messages SET title = $1, body = $2 WHERE id = $3")
            .bind(&message.title)
            .bind(&message.body)
            .bind(message.id)
            .execute(&self.pool)
            .await?;

        Ok(message)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }
}
