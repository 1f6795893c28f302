use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::Actor;

/// Участник, известный боту
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub tg_id: i64,
    pub firstname: String,
    pub lastname: String,
    pub tg_username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        if self.lastname.is_empty() {
            self.firstname.clone()
        } else {
            format!("{} {}", self.firstname, self.lastname)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub tg_id: i64,
    pub firstname: String,
    pub lastname: String,
    pub tg_username: String,
}

impl From<&Actor> for NewUser {
    fn from(actor: &Actor) -> Self {
        Self {
            tg_id: actor.id.0 as i64,
            firstname: actor.first_name.clone(),
            lastname: actor.last_name.clone(),
            tg_username: actor.username.clone(),
        }
    }
}
