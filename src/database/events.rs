use async_trait::async_trait;
use sqlx::PgPool;

use super::{EventRepository, RepositoryError};
use crate::models::Event;

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn last_actual(&self, limit: i64) -> Result<Vec<Event>, RepositoryError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, name, type, status, started_at
            FROM events
            WHERE status = $1
            ORDER BY started_at ASC NULLS LAST, id ASC
            LIMIT $2
            "#,
        )
        .bind(Event::STATUS_ACTUAL)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}
