use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::models::{Event, NewProfile, NewUser, PollRecord, Profile, ProfileField, User};

pub mod events;
pub mod polls;
pub mod profiles;
pub mod users;

pub use events::PgEventRepository;
pub use polls::PgPollRepository;
pub use profiles::PgProfileRepository;
pub use users::PgUserRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record {0} disappeared during update")]
    Missing(i64),
}

/// Пользователи. "Не найден" - это `Ok(None)`, а не ошибка.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;
    async fn get_by_telegram_id(&self, tg_id: i64) -> Result<Option<User>, RepositoryError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn create(&self, user: NewUser) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<Profile>, RepositoryError>;
    async fn create(&self, profile: NewProfile) -> Result<i64, RepositoryError>;
    /// Обновляет одно поле существующего профиля
    async fn update(&self, id: i64, field: ProfileField, value: &str)
        -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PollRepository: Send + Sync {
    async fn create_poll(&self, record: &PollRecord) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Актуальные мероприятия, ближайшие первыми
    async fn last_actual(&self, limit: i64) -> Result<Vec<Event>, RepositoryError>;
}

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn init(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                tg_id BIGINT NOT NULL UNIQUE,
                firstname TEXT NOT NULL DEFAULT '',
                lastname TEXT NOT NULL DEFAULT '',
                tg_username TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                bio TEXT NOT NULL DEFAULT '',
                linkedin TEXT NOT NULL DEFAULT '',
                github TEXT NOT NULL DEFAULT '',
                website TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS random_coffee_polls (
                id BIGSERIAL PRIMARY KEY,
                message_id BIGINT NOT NULL,
                chat_id BIGINT NOT NULL,
                telegram_poll_id TEXT NOT NULL,
                week_start_date TIMESTAMP WITH TIME ZONE NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT 'club-call',
                status TEXT NOT NULL DEFAULT 'actual',
                started_at TIMESTAMP WITH TIME ZONE,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_users_tg_username ON users (LOWER(tg_username))",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
