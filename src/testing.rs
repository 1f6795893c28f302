//! In-memory collaborators for unit tests.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::database::{
    EventRepository, PollRepository, ProfileRepository, RepositoryError, UserRepository,
};
use crate::models::{
    Actor, Event, Incoming, NewProfile, NewUser, PollRecord, Profile, ProfileField, User,
};
use crate::services::{
    MessageSender, OutgoingMessage, PermissionGate, PollRequest, SenderError, SentMessage, SentPoll,
};

pub fn actor(user_id: u64) -> Actor {
    Actor {
        id: UserId(user_id),
        first_name: format!("User{user_id}"),
        last_name: String::new(),
        username: format!("user{user_id}"),
    }
}

/// Сообщение пользователя в личном чате
pub fn incoming(user_id: u64) -> Incoming {
    Incoming {
        actor: actor(user_id),
        chat_id: ChatId(user_id as i64),
        is_private: true,
        message_id: Some(MessageId(100_000)),
    }
}

fn db_error() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SentItem {
    Message {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        has_keyboard: bool,
    },
    Deleted {
        chat_id: ChatId,
        message_id: MessageId,
    },
    KeyboardRemoved {
        chat_id: ChatId,
        message_id: MessageId,
    },
    Poll {
        chat_id: ChatId,
        message_id: MessageId,
        request: PollRequest,
    },
}

#[derive(Default)]
pub struct RecordingSender {
    items: Mutex<Vec<SentItem>>,
    next_id: AtomicI32,
    fail_sends: AtomicBool,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<SentItem> {
        self.items.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|item| match item {
                SentItem::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_message_id(&self) -> Option<MessageId> {
        self.sent().into_iter().rev().find_map(|item| match item {
            SentItem::Message { message_id, .. } => Some(message_id),
            _ => None,
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn check(&self) -> Result<(), SenderError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            Err(SenderError::Request(teloxide::RequestError::Io(
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset").into(),
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(
        &self,
        chat_id: ChatId,
        message: OutgoingMessage,
    ) -> Result<SentMessage, SenderError> {
        self.check()?;
        let message_id = self.next_message_id();
        self.items.lock().unwrap().push(SentItem::Message {
            chat_id,
            message_id,
            text: message.text,
            has_keyboard: message.keyboard.is_some(),
        });
        Ok(SentMessage { chat_id, message_id })
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), SenderError> {
        self.items
            .lock()
            .unwrap()
            .push(SentItem::Deleted { chat_id, message_id });
        Ok(())
    }

    async fn remove_inline_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), SenderError> {
        self.items
            .lock()
            .unwrap()
            .push(SentItem::KeyboardRemoved { chat_id, message_id });
        Ok(())
    }

    async fn send_poll(&self, chat_id: ChatId, poll: PollRequest) -> Result<SentPoll, SenderError> {
        self.check()?;
        let message_id = self.next_message_id();
        self.items.lock().unwrap().push(SentItem::Poll {
            chat_id,
            message_id,
            request: poll,
        });
        Ok(SentPoll {
            chat_id,
            message_id,
            poll_id: format!("poll-{}", message_id.0),
        })
    }
}

pub struct FixedGate {
    member: bool,
    admin: bool,
}

impl FixedGate {
    pub fn member() -> Self {
        Self { member: true, admin: false }
    }

    pub fn admin() -> Self {
        Self { member: true, admin: true }
    }

    pub fn stranger() -> Self {
        Self { member: false, admin: false }
    }
}

#[async_trait]
impl PermissionGate for FixedGate {
    async fn is_club_member(&self, _user_id: UserId) -> bool {
        self.member
    }

    async fn is_admin(&self, _user_id: UserId) -> bool {
        self.admin
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUsers {
    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.all().into_iter().find(|u| u.id == id))
    }

    async fn get_by_telegram_id(&self, tg_id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.all().into_iter().find(|u| u.tg_id == tg_id))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .all()
            .into_iter()
            .find(|u| u.tg_username.eq_ignore_ascii_case(username)))
    }

    async fn create(&self, user: NewUser) -> Result<i64, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.users.lock().unwrap().push(User {
            id,
            tg_id: user.tg_id,
            firstname: user.firstname,
            lastname: user.lastname,
            tg_username: user.tg_username,
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    profiles: Mutex<Vec<Profile>>,
    next_id: AtomicI64,
    fail: AtomicBool,
}

impl InMemoryProfiles {
    pub fn all(&self) -> Vec<Profile> {
        self.profiles.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(db_error())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<Profile>, RepositoryError> {
        self.check()?;
        Ok(self.all().into_iter().find(|p| p.user_id == user_id))
    }

    async fn create(&self, profile: NewProfile) -> Result<i64, RepositoryError> {
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.profiles.lock().unwrap().push(Profile {
            id,
            user_id: profile.user_id,
            bio: profile.bio,
            linkedin: profile.linkedin,
            github: profile.github,
            website: profile.website,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    async fn update(
        &self,
        id: i64,
        field: ProfileField,
        value: &str,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::Missing(id))?;
        let slot = match field {
            ProfileField::Bio => &mut profile.bio,
            ProfileField::Linkedin => &mut profile.linkedin,
            ProfileField::Github => &mut profile.github,
            ProfileField::Website => &mut profile.website,
        };
        *slot = value.to_string();
        profile.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPolls {
    records: Mutex<Vec<PollRecord>>,
    fail: AtomicBool,
}

impl InMemoryPolls {
    pub fn records(&self) -> Vec<PollRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PollRepository for InMemoryPolls {
    async fn create_poll(&self, record: &PollRecord) -> Result<i64, RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(db_error());
        }
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(records.len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryEvents {
    events: Mutex<Vec<Event>>,
    fail: AtomicBool,
}

impl InMemoryEvents {
    pub fn with(events: Vec<Event>) -> Self {
        Self {
            events: Mutex::new(events),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventRepository for InMemoryEvents {
    async fn last_actual(&self, limit: i64) -> Result<Vec<Event>, RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(db_error());
        }
        let mut events: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.status == Event::STATUS_ACTUAL)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.started_at.is_none(), e.started_at, e.id));
        events.truncate(limit.max(0) as usize);
        Ok(events)
    }
}
