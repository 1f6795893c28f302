//! Диалог о профилях участников.
//!
//! Один активный диалог на пользователя, в чате виден только последний
//! экран бота: каждый новый экран вытесняет предыдущий. Таблица переходов
//! описана в [`spec::ConversationSpec`].

use std::sync::Arc;

use crate::database::{ProfileRepository, RepositoryError, UserRepository};
use crate::models::{Actor, Incoming, NewProfile, NewUser, PreviousMessage, ProfileField, User};
use crate::services::{MessageSender, OutgoingMessage, PermissionsService, SenderError};
use crate::session_store::SessionStore;

pub mod screens;
pub mod spec;
pub mod validation;

#[cfg(test)]
mod tests;

pub use spec::{ConversationSpec, Handler, InputClass, ProfileAction, ProfileState};

use validation::{normalize_username, validate_field};

pub const PROFILE_COMMAND: &str = "profile";
const FIELD_KEY: &str = "profile_field";

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error(transparent)]
    Send(#[from] SenderError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Входные данные диалога
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Команда входа `/profile`
    Command,
    /// Команда выхода `/cancel`
    Cancel,
    Action(ProfileAction),
    Text(String),
}

/// Результат обработки входа
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Denied,
    Moved(ProfileState),
    /// Ввод не прошёл проверку, запрос повторён
    Stayed(ProfileState),
    Ended,
    Ignored,
}

pub struct ProfileConversation {
    spec: ConversationSpec,
    sessions: SessionStore,
    sender: Arc<dyn MessageSender>,
    permissions: PermissionsService,
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileConversation {
    pub fn new(
        sessions: SessionStore,
        sender: Arc<dyn MessageSender>,
        permissions: PermissionsService,
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            spec: ConversationSpec::profile(),
            sessions,
            sender,
            permissions,
            users,
            profiles,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn handle(&self, incoming: &Incoming, input: Input) -> Result<Outcome, ConversationError> {
        let user_id = incoming.actor.id;
        if input != Input::Command && !incoming.is_private {
            // Диалог живёт только в личном чате с ботом
            log::debug!(
                "Input from user {} in chat {} is outside the profile dialog",
                user_id,
                incoming.chat_id
            );
            return Ok(Outcome::Ignored);
        }
        let (class, text) = match input {
            Input::Command => return self.enter(incoming).await,
            Input::Cancel => return Ok(self.cancel(incoming).await),
            Input::Action(action) => (InputClass::Action(action), None),
            Input::Text(text) => (InputClass::Text, Some(text)),
        };

        let Some(state) = self.sessions.state(user_id).await else {
            log::debug!("No active profile dialog for user {}, {:?} ignored", user_id, class);
            return Ok(Outcome::Ignored);
        };
        let Some(route) = self.spec.route(state, class) else {
            log::debug!("User {} in {:?}: {:?} is not accepted", user_id, state, class);
            return Ok(Outcome::Ignored);
        };
        let Some(next) = route.next else {
            return Ok(self.cancel(incoming).await);
        };
        log::debug!("User {}: {:?} --{:?}--> {:?}", user_id, state, class, next);

        let text = text.unwrap_or_default();
        match route.handler {
            Handler::ShowMainMenu => self.show(incoming, next, screens::main_menu()).await,
            Handler::ShowOwnProfile => self.show_own_profile(incoming, next).await,
            Handler::ShowEditMenu => self.show_edit_menu(incoming, next).await,
            Handler::AskUsername => self.show(incoming, next, screens::ask_username(None)).await,
            Handler::AskField(field) => self.ask_field(incoming, field, next).await,
            Handler::SearchProfile => self.search_profile(incoming, state, &text, next).await,
            Handler::SaveField(field) => self.save_field(incoming, state, field, &text, next).await,
            Handler::Cancel => Ok(self.cancel(incoming).await),
        }
    }

    async fn enter(&self, incoming: &Incoming) -> Result<Outcome, ConversationError> {
        if !self.permissions.check_private_chat(incoming, PROFILE_COMMAND).await {
            return Ok(Outcome::Denied);
        }
        if !self.permissions.check_club_member(incoming, PROFILE_COMMAND).await {
            return Ok(Outcome::Denied);
        }

        let sent = self.sender.send(incoming.chat_id, screens::main_menu()).await?;
        let user_id = incoming.actor.id;
        self.sessions.begin(user_id, ProfileState::ViewOptions).await;
        let prompt = PreviousMessage {
            chat_id: sent.chat_id,
            message_id: sent.message_id,
        };
        if let Some(Some(old)) = self.sessions.replace_previous_message(user_id, prompt).await {
            self.delete_quietly(old).await;
        }

        log::info!("👤 Profile dialog started for user {}", user_id);
        Ok(Outcome::Moved(ProfileState::ViewOptions))
    }

    /// Безусловное завершение: сессия удаляется до любых сетевых вызовов
    async fn cancel(&self, incoming: &Incoming) -> Outcome {
        let user_id = incoming.actor.id;
        let Some(session) = self.sessions.clear(user_id).await else {
            log::debug!("Cancel from user {} without active dialog", user_id);
            return Outcome::Ignored;
        };

        if let Some(previous) = session.previous_message {
            if let Err(e) = self
                .sender
                .remove_inline_keyboard(previous.chat_id, previous.message_id)
                .await
            {
                log::warn!("Failed to remove keyboard for user {}: {}", user_id, e);
            }
        }

        let message = OutgoingMessage::html(screens::CANCELLED_TEXT);
        let result = match incoming.message_id {
            Some(message_id) => self.sender.reply(incoming.chat_id, message_id, message).await,
            None => self.sender.send(incoming.chat_id, message).await,
        };
        if let Err(e) = result {
            log::warn!("Failed to confirm cancel to user {}: {}", user_id, e);
        }

        log::info!("👋 Profile dialog ended for user {} in {:?}", user_id, session.state);
        Outcome::Ended
    }

    async fn show(
        &self,
        incoming: &Incoming,
        next: ProfileState,
        message: OutgoingMessage,
    ) -> Result<Outcome, ConversationError> {
        self.present(incoming, next, message).await?;
        Ok(Outcome::Moved(next))
    }

    /// Отправляет новый экран, затем фиксирует состояние и убирает прежний экран.
    /// При ошибке отправки сессия не меняется.
    async fn present(
        &self,
        incoming: &Incoming,
        state: ProfileState,
        message: OutgoingMessage,
    ) -> Result<(), ConversationError> {
        let user_id = incoming.actor.id;
        let sent = self.sender.send(incoming.chat_id, message).await?;
        let prompt = PreviousMessage {
            chat_id: sent.chat_id,
            message_id: sent.message_id,
        };

        match self.sessions.advance(user_id, state, prompt).await {
            Some(Some(old)) => self.delete_quietly(old).await,
            Some(None) => {}
            None => {
                log::warn!("Profile dialog of user {} ended while a screen was sent", user_id);
                self.delete_quietly(prompt).await;
            }
        }
        Ok(())
    }

    async fn delete_quietly(&self, message: PreviousMessage) {
        if let Err(e) = self
            .sender
            .delete_message(message.chat_id, message.message_id)
            .await
        {
            log::warn!("Failed to delete message {} in {}: {}", message.message_id.0, message.chat_id, e);
        }
    }

    /// Ответ пользователя убирается из чата, остаётся только экран бота
    async fn delete_user_input(&self, incoming: &Incoming) {
        if let Some(message_id) = incoming.message_id {
            self.delete_quietly(PreviousMessage {
                chat_id: incoming.chat_id,
                message_id,
            })
            .await;
        }
    }

    /// Сообщает об ошибке хранилища; состояние диалога не меняется
    async fn fail(
        &self,
        incoming: &Incoming,
        text: &str,
        error: RepositoryError,
    ) -> Result<Outcome, ConversationError> {
        log::error!("Profile dialog of user {}: {}", incoming.actor.id, error);
        if let Err(e) = self
            .sender
            .send(incoming.chat_id, OutgoingMessage::html(text))
            .await
        {
            log::warn!("Failed to report error to user {}: {}", incoming.actor.id, e);
        }
        Err(error.into())
    }

    async fn show_own_profile(
        &self,
        incoming: &Incoming,
        next: ProfileState,
    ) -> Result<Outcome, ConversationError> {
        let user = match self.get_or_create_user(&incoming.actor).await {
            Ok(user) => user,
            Err(e) => return self.fail(incoming, screens::LOAD_ERROR_TEXT, e).await,
        };
        let profile = match self.profiles.get_by_user_id(user.id).await {
            Ok(profile) => profile,
            Err(e) => return self.fail(incoming, screens::LOAD_ERROR_TEXT, e).await,
        };

        self.show(incoming, next, screens::profile_view(&user, profile.as_ref(), true))
            .await
    }

    async fn show_edit_menu(
        &self,
        incoming: &Incoming,
        next: ProfileState,
    ) -> Result<Outcome, ConversationError> {
        if let Err(e) = self.get_or_create_user(&incoming.actor).await {
            return self.fail(incoming, screens::LOAD_ERROR_TEXT, e).await;
        }
        self.sessions.remove(incoming.actor.id, FIELD_KEY).await;
        self.show(incoming, next, screens::edit_menu(None)).await
    }

    async fn ask_field(
        &self,
        incoming: &Incoming,
        field: ProfileField,
        next: ProfileState,
    ) -> Result<Outcome, ConversationError> {
        let current = match self.current_value(&incoming.actor, field).await {
            Ok(current) => current,
            Err(e) => return self.fail(incoming, screens::LOAD_ERROR_TEXT, e).await,
        };

        self.present(incoming, next, screens::ask_field(field, current.as_deref(), None))
            .await?;
        self.sessions
            .set(incoming.actor.id, FIELD_KEY, field.column())
            .await;
        Ok(Outcome::Moved(next))
    }

    async fn search_profile(
        &self,
        incoming: &Incoming,
        state: ProfileState,
        text: &str,
        next: ProfileState,
    ) -> Result<Outcome, ConversationError> {
        self.delete_user_input(incoming).await;

        let Some(username) = normalize_username(text) else {
            let prompt = screens::ask_username(Some("Пожалуйста, введи корректное имя пользователя."));
            self.present(incoming, state, prompt).await?;
            return Ok(Outcome::Stayed(state));
        };

        let found = match self.users.get_by_username(&username).await {
            Ok(found) => found,
            Err(e) => return self.fail(incoming, screens::LOAD_ERROR_TEXT, e).await,
        };
        let Some(found) = found else {
            log::info!("User {} searched for unknown @{}", incoming.actor.id, username);
            return self.show(incoming, next, screens::username_not_found(&username)).await;
        };

        let profile = match self.profiles.get_by_user_id(found.id).await {
            Ok(profile) => profile,
            Err(e) => return self.fail(incoming, screens::LOAD_ERROR_TEXT, e).await,
        };
        let own = found.tg_id == incoming.actor.id.0 as i64;
        self.show(incoming, next, screens::profile_view(&found, profile.as_ref(), own))
            .await
    }

    async fn save_field(
        &self,
        incoming: &Incoming,
        state: ProfileState,
        field: ProfileField,
        text: &str,
        next: ProfileState,
    ) -> Result<Outcome, ConversationError> {
        let user_id = incoming.actor.id;
        self.delete_user_input(incoming).await;

        let value = match validate_field(field, text) {
            Ok(value) => value,
            Err(reason) => {
                log::info!("User {} sent invalid {}: {}", user_id, field.column(), reason);
                let current = self
                    .current_value(&incoming.actor, field)
                    .await
                    .unwrap_or_else(|e| {
                        log::warn!("Failed to load current {} of user {}: {}", field.column(), user_id, e);
                        None
                    });
                self.present(
                    incoming,
                    state,
                    screens::ask_field(field, current.as_deref(), Some(reason)),
                )
                .await?;
                return Ok(Outcome::Stayed(state));
            }
        };

        if let Err(e) = self.save_profile_field(&incoming.actor, field, &value).await {
            return self.fail(incoming, screens::SAVE_ERROR_TEXT, e).await;
        }
        log::info!("💾 User {} updated {}", user_id, field.column());

        self.sessions.remove(user_id, FIELD_KEY).await;
        self.show(incoming, next, screens::edit_menu(Some(screens::field_saved(field))))
            .await
    }

    async fn get_or_create_user(&self, actor: &Actor) -> Result<User, RepositoryError> {
        let tg_id = actor.id.0 as i64;
        if let Some(user) = self.users.get_by_telegram_id(tg_id).await? {
            return Ok(user);
        }

        let id = self.users.create(NewUser::from(actor)).await?;
        self.users
            .get_by_id(id)
            .await?
            .ok_or(RepositoryError::Missing(id))
    }

    async fn current_value(
        &self,
        actor: &Actor,
        field: ProfileField,
    ) -> Result<Option<String>, RepositoryError> {
        let Some(user) = self.users.get_by_telegram_id(actor.id.0 as i64).await? else {
            return Ok(None);
        };
        let profile = self.profiles.get_by_user_id(user.id).await?;
        Ok(profile.map(|p| p.field(field).to_string()))
    }

    /// Создаёт профиль с одним полем или обновляет только это поле
    async fn save_profile_field(
        &self,
        actor: &Actor,
        field: ProfileField,
        value: &str,
    ) -> Result<(), RepositoryError> {
        let user = self.get_or_create_user(actor).await?;
        match self.profiles.get_by_user_id(user.id).await? {
            Some(profile) => self.profiles.update(profile.id, field, value).await,
            None => {
                self.profiles
                    .create(NewProfile::with_field(user.id, field, value))
                    .await?;
                Ok(())
            }
        }
    }
}
