use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, tg_id, firstname, lastname, tg_username, created_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_by_telegram_id(&self, tg_id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tg_id = $1"
        ))
        .bind(tg_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(tg_username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (tg_id, firstname, lastname, tg_username)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tg_id) DO UPDATE SET
                firstname = EXCLUDED.firstname,
                lastname = EXCLUDED.lastname,
                tg_username = EXCLUDED.tg_username,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(user.tg_id)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.tg_username)
        .fetch_one(&self.pool)
        .await?;

        log::debug!("👤 User {} stored with id {}", user.tg_id, id);
        Ok(id)
    }
}
