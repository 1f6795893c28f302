use async_trait::async_trait;
use sqlx::PgPool;

use super::{PollRepository, RepositoryError};
use crate::models::PollRecord;

#[derive(Clone)]
pub struct PgPollRepository {
    pool: PgPool,
}

impl PgPollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollRepository for PgPollRepository {
    async fn create_poll(&self, record: &PollRecord) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO random_coffee_polls (message_id, chat_id, telegram_poll_id, week_start_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(record.message_id as i64)
        .bind(record.chat_id)
        .bind(&record.telegram_poll_id)
        .bind(record.week_start_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
