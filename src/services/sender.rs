use async_trait::async_trait;
use teloxide::payloads::{SendMessageSetters, SendPollSetters};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardMarkup, MessageId, ParseMode, ReplyParameters, ThreadId,
};

#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
    #[error("telegram returned a message without a poll")]
    MissingPoll,
}

/// Исходящее текстовое сообщение (HTML-разметка)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
    pub reply_to: Option<MessageId>,
}

impl OutgoingMessage {
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub is_anonymous: bool,
    pub allows_multiple_answers: bool,
    pub topic_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPoll {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub poll_id: String,
}

/// Исходящий канал сообщений
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: ChatId, message: OutgoingMessage)
        -> Result<SentMessage, SenderError>;

    async fn reply(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        mut message: OutgoingMessage,
    ) -> Result<SentMessage, SenderError> {
        message.reply_to = Some(reply_to);
        self.send(chat_id, message).await
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId)
        -> Result<(), SenderError>;

    async fn remove_inline_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), SenderError>;

    async fn send_poll(&self, chat_id: ChatId, poll: PollRequest) -> Result<SentPoll, SenderError>;
}

#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(
        &self,
        chat_id: ChatId,
        message: OutgoingMessage,
    ) -> Result<SentMessage, SenderError> {
        let mut request = self
            .bot
            .send_message(chat_id, message.text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = message.keyboard {
            request = request.reply_markup(keyboard);
        }
        if let Some(reply_to) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(reply_to));
        }

        let sent = request.await?;
        Ok(SentMessage {
            chat_id: sent.chat.id,
            message_id: sent.id,
        })
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), SenderError> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn remove_inline_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), SenderError> {
        self.bot
            .edit_message_reply_markup(chat_id, message_id)
            .await?;
        Ok(())
    }

    async fn send_poll(&self, chat_id: ChatId, poll: PollRequest) -> Result<SentPoll, SenderError> {
        let mut request = self
            .bot
            .send_poll(chat_id, poll.question, poll.options)
            .is_anonymous(poll.is_anonymous)
            .allows_multiple_answers(poll.allows_multiple_answers);
        if let Some(topic_id) = poll.topic_id {
            request = request.message_thread_id(ThreadId(MessageId(topic_id)));
        }

        let sent = request.await?;
        let poll_id = sent.poll().ok_or(SenderError::MissingPoll)?.id.to_string();
        log::info!(
            "📊 Poll sent. MessageID: {}, ChatID: {}",
            sent.id.0,
            sent.chat.id
        );

        Ok(SentPoll {
            chat_id: sent.chat.id,
            message_id: sent.id,
            poll_id,
        })
    }
}
