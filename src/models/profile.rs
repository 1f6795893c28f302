use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Bio => &self.bio,
            ProfileField::Linkedin => &self.linkedin,
            ProfileField::Github => &self.github,
            ProfileField::Website => &self.website,
        }
    }
}

/// Редактируемые поля профиля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Bio,
    Linkedin,
    Github,
    Website,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Bio,
        ProfileField::Linkedin,
        ProfileField::Github,
        ProfileField::Website,
    ];

    /// Имя колонки в таблице `profiles`
    pub fn column(self) -> &'static str {
        match self {
            ProfileField::Bio => "bio",
            ProfileField::Linkedin => "linkedin",
            ProfileField::Github => "github",
            ProfileField::Website => "website",
        }
    }
}

/// Значения для нового профиля: заполнено только одно поле
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProfile {
    pub user_id: i64,
    pub bio: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
}

impl NewProfile {
    pub fn with_field(user_id: i64, field: ProfileField, value: &str) -> Self {
        let mut profile = NewProfile {
            user_id,
            ..Default::default()
        };
        let slot = match field {
            ProfileField::Bio => &mut profile.bio,
            ProfileField::Linkedin => &mut profile.linkedin,
            ProfileField::Github => &mut profile.github,
            ProfileField::Website => &mut profile.website,
        };
        *slot = value.to_string();
        profile
    }
}
