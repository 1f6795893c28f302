use std::collections::HashMap;

use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, MessageId};

use crate::conversation::ProfileState;

/// Последнее сообщение бота, показанное пользователю
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone)]
pub struct UserSession {
    pub state: ProfileState,
    pub attributes: HashMap<String, String>,
    pub previous_message: Option<PreviousMessage>,
    pub touched_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(state: ProfileState) -> Self {
        Self {
            state,
            attributes: HashMap::new(),
            previous_message: None,
            touched_at: Utc::now(),
        }
    }
}
