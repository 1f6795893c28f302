use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use teloxide::types::{ChatId, MessageId, UserId};
use tokio::sync::RwLock;

use crate::conversation::ProfileState;
use crate::models::{PreviousMessage, UserSession};

type Sessions = Arc<RwLock<HashMap<UserId, UserSession>>>;

/// Хранилище активных диалогов в памяти процесса.
///
/// Все операции держат блокировку только на время изменения карты,
/// сетевые вызовы выполняются вызывающей стороной вне блокировки.
/// Записи для пользователя без активного диалога не создаются:
/// `set`/`set_previous_message` без `begin` ничего не делают.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Sessions,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Открывает диалог (или сбрасывает текущий) в состоянии `state`.
    /// Ссылка на последнее сообщение бота сохраняется, чтобы его можно было убрать.
    pub async fn begin(&self, user_id: UserId, state: ProfileState) {
        let mut sessions = self.sessions.write().await;
        let previous = sessions.get(&user_id).and_then(|s| s.previous_message);
        let mut session = UserSession::new(state);
        session.previous_message = previous;
        sessions.insert(user_id, session);
    }

    pub async fn state(&self, user_id: UserId) -> Option<ProfileState> {
        self.sessions.read().await.get(&user_id).map(|s| s.state)
    }

    pub async fn contains(&self, user_id: UserId) -> bool {
        self.sessions.read().await.contains_key(&user_id)
    }

    pub async fn set(&self, user_id: UserId, key: &str, value: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&user_id) {
            Some(session) => {
                session.attributes.insert(key.to_string(), value.to_string());
                session.touched_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn get(&self, user_id: UserId, key: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .and_then(|s| s.attributes.get(key).cloned())
    }

    pub async fn remove(&self, user_id: UserId, key: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        sessions
            .get_mut(&user_id)
            .and_then(|s| s.attributes.remove(key))
    }

    /// Завершает диалог, возвращая его последнее состояние
    pub async fn clear(&self, user_id: UserId) -> Option<UserSession> {
        self.sessions.write().await.remove(&user_id)
    }

    pub async fn set_previous_message(
        &self,
        user_id: UserId,
        message_id: MessageId,
        chat_id: ChatId,
    ) -> bool {
        self.replace_previous_message(user_id, PreviousMessage { chat_id, message_id })
            .await
            .is_some()
    }

    pub async fn previous_message(&self, user_id: UserId) -> Option<PreviousMessage> {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .and_then(|s| s.previous_message)
    }

    /// Записывает новое сообщение бота и возвращает вытесненное.
    ///
    /// `None` - диалога нет; `Some(None)` - предыдущего сообщения не было.
    pub async fn replace_previous_message(
        &self,
        user_id: UserId,
        message: PreviousMessage,
    ) -> Option<Option<PreviousMessage>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user_id)?;
        session.touched_at = Utc::now();
        Some(session.previous_message.replace(message))
    }

    /// Переход: новое состояние и новое сообщение бота фиксируются одной операцией.
    /// Возвращает вытесненное сообщение, которое нужно удалить из чата.
    pub async fn advance(
        &self,
        user_id: UserId,
        state: ProfileState,
        message: PreviousMessage,
    ) -> Option<Option<PreviousMessage>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user_id)?;
        session.state = state;
        session.touched_at = Utc::now();
        Some(session.previous_message.replace(message))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Удаляет диалоги, к которым не обращались дольше `max_idle`
    pub async fn evict_idle(&self, max_idle: Duration, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let previous_count = sessions.len();
        sessions.retain(|_, session| now - session.touched_at < max_idle);
        let evicted = previous_count - sessions.len();
        log::debug!(
            "🧹 Sessions cleaned: {} -> {} entries",
            previous_count,
            sessions.len()
        );
        evicted
    }
}
