use teloxide::types::{ChatId, MessageId, UserId};

/// Автор входящего обновления
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// Транспортно-независимое описание входящего сообщения или нажатия кнопки
#[derive(Debug, Clone)]
pub struct Incoming {
    pub actor: Actor,
    pub chat_id: ChatId,
    pub is_private: bool,
    /// Сообщение пользователя (для текста и команд); для callback - сообщение бота с кнопками
    pub message_id: Option<MessageId>,
}
