use async_trait::async_trait;
use sqlx::PgPool;

use super::{ProfileRepository, RepositoryError};
use crate::models::{NewProfile, Profile, ProfileField};

#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<Profile>, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, bio, linkedin, github, website, created_at, updated_at
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn create(&self, profile: NewProfile) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO profiles (user_id, bio, linkedin, github, website)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(&profile.linkedin)
        .bind(&profile.github)
        .bind(&profile.website)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(
        &self,
        id: i64,
        field: ProfileField,
        value: &str,
    ) -> Result<(), RepositoryError> {
        // Имя колонки берётся только из ProfileField
        let query = format!(
            "UPDATE profiles SET {} = $1, updated_at = NOW() WHERE id = $2",
            field.column()
        );
        let result = sqlx::query(&query)
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Missing(id));
        }
        Ok(())
    }
}
