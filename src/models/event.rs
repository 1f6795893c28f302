use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Мероприятие клуба
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
}

impl Event {
    pub const STATUS_ACTUAL: &'static str = "actual";

    pub fn kind_emoji(&self) -> &'static str {
        match self.kind.as_str() {
            "club-call" => "💬",
            "meetup" => "🎙",
            _ => "🔄",
        }
    }
}
