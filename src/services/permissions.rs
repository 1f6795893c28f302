use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, UserId};

use crate::models::Incoming;
use crate::services::sender::{MessageSender, OutgoingMessage};

const PRIVATE_CHAT_ONLY_TEXT: &str = "<b>Прошу прощения</b> 🧐\n\n\
    Эта команда работает только в <i>личной беседе</i> со мной. \
    Напиши мне в ЛС, и я с удовольствием помогу.\n\n\
    Данное сообщение и твоя команда будут автоматически удалены через 10 секунд.";
const CLUB_MEMBERS_ONLY_TEXT: &str = "Эта команда доступна только участникам клуба.";
const ADMINS_ONLY_TEXT: &str = "Эта команда доступна только администраторам.";

const DENIAL_CLEANUP_DELAY: Duration = Duration::from_secs(10);

/// Проверки прав пользователя
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn is_club_member(&self, user_id: UserId) -> bool;
    async fn is_admin(&self, user_id: UserId) -> bool;
}

/// Права по статусу участника в супергруппе клуба
pub struct TelegramPermissionGate {
    bot: Bot,
    club_chat_id: Option<ChatId>,
}

impl TelegramPermissionGate {
    pub fn new(bot: Bot, club_chat_id: Option<ChatId>) -> Self {
        Self { bot, club_chat_id }
    }

    async fn member(&self, user_id: UserId) -> Option<teloxide::types::ChatMember> {
        let Some(chat_id) = self.club_chat_id else {
            log::warn!("SUPER_GROUP_CHAT_ID is not configured, user {} has no club rights", user_id);
            return None;
        };
        match self.bot.get_chat_member(chat_id, user_id).await {
            Ok(member) => Some(member),
            Err(e) => {
                log::error!("Failed to get chat member {} in {}: {}", user_id, chat_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl PermissionGate for TelegramPermissionGate {
    async fn is_club_member(&self, user_id: UserId) -> bool {
        self.member(user_id).await.is_some_and(|m| m.is_present())
    }

    async fn is_admin(&self, user_id: UserId) -> bool {
        self.member(user_id).await.is_some_and(|m| m.is_privileged())
    }
}

/// Проверки с ответом-отказом пользователю.
///
/// `false` означает, что обработчик должен прекратить работу без изменения состояния.
#[derive(Clone)]
pub struct PermissionsService {
    gate: Arc<dyn PermissionGate>,
    sender: Arc<dyn MessageSender>,
}

impl PermissionsService {
    pub fn new(gate: Arc<dyn PermissionGate>, sender: Arc<dyn MessageSender>) -> Self {
        Self { gate, sender }
    }

    pub fn gate(&self) -> &Arc<dyn PermissionGate> {
        &self.gate
    }

    pub async fn check_private_chat(&self, incoming: &Incoming, command: &str) -> bool {
        if incoming.is_private {
            return true;
        }

        log::info!(
            "User {} tried to use {} outside of private chat",
            incoming.actor.id,
            command
        );
        let reply = match incoming.message_id {
            Some(message_id) => {
                self.sender
                    .reply(
                        incoming.chat_id,
                        message_id,
                        OutgoingMessage::html(PRIVATE_CHAT_ONLY_TEXT),
                    )
                    .await
            }
            None => {
                self.sender
                    .send(incoming.chat_id, OutgoingMessage::html(PRIVATE_CHAT_ONLY_TEXT))
                    .await
            }
        };

        match reply {
            Ok(sent) => {
                // Отказ и исходная команда удаляются из группового чата
                let sender = self.sender.clone();
                let original = incoming.message_id;
                tokio::spawn(async move {
                    tokio::time::sleep(DENIAL_CLEANUP_DELAY).await;
                    if let Err(e) = sender.delete_message(sent.chat_id, sent.message_id).await {
                        log::warn!("Failed to delete denial message after delay: {}", e);
                    }
                    if let Some(original) = original {
                        if let Err(e) = sender.delete_message(sent.chat_id, original).await {
                            log::warn!("Failed to delete original message after delay: {}", e);
                        }
                    }
                });
            }
            Err(e) => log::error!("Failed to send private-only message: {}", e),
        }
        false
    }

    pub async fn check_club_member(&self, incoming: &Incoming, command: &str) -> bool {
        if self.gate.is_club_member(incoming.actor.id).await {
            return true;
        }
        log::info!(
            "User {} tried to use {} without club member rights",
            incoming.actor.id,
            command
        );
        self.deny(incoming, CLUB_MEMBERS_ONLY_TEXT).await;
        false
    }

    pub async fn check_admin(&self, incoming: &Incoming, command: &str) -> bool {
        if self.gate.is_admin(incoming.actor.id).await {
            return true;
        }
        log::info!(
            "User {} tried to use {} without admin rights",
            incoming.actor.id,
            command
        );
        self.deny(incoming, ADMINS_ONLY_TEXT).await;
        false
    }

    pub async fn check_admin_and_private_chat(&self, incoming: &Incoming, command: &str) -> bool {
        self.check_admin(incoming, command).await && self.check_private_chat(incoming, command).await
    }

    async fn deny(&self, incoming: &Incoming, text: &str) {
        let message = OutgoingMessage::html(text);
        let result = match incoming.message_id {
            Some(message_id) => self.sender.reply(incoming.chat_id, message_id, message).await,
            None => self.sender.send(incoming.chat_id, message).await,
        };
        if let Err(e) = result {
            log::error!("Failed to send denial message: {}", e);
        }
    }
}
