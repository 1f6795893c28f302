use chrono::{DateTime, Utc};

/// Запись об отправленном еженедельном опросе
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRecord {
    pub message_id: i32,
    pub chat_id: i64,
    pub telegram_poll_id: String,
    pub week_start_date: DateTime<Utc>,
}
