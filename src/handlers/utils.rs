use teloxide::prelude::*;
use teloxide::types::User;

use crate::models::{Actor, Incoming};

pub fn actor_from_user(user: &User) -> Actor {
    Actor {
        id: user.id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone().unwrap_or_default(),
        username: user.username.clone().unwrap_or_default(),
    }
}

/// Сообщения без автора (например, от имени канала) не обрабатываются
pub fn incoming_from_message(msg: &Message) -> Option<Incoming> {
    let user = msg.from.as_ref()?;
    Some(Incoming {
        actor: actor_from_user(user),
        chat_id: msg.chat.id,
        is_private: msg.chat.is_private(),
        message_id: Some(msg.id),
    })
}

pub fn incoming_from_callback(q: &CallbackQuery) -> Option<Incoming> {
    let message = q.message.as_ref()?;
    Some(Incoming {
        actor: actor_from_user(&q.from),
        chat_id: message.chat().id,
        is_private: message.chat().is_private(),
        message_id: Some(message.id()),
    })
}
