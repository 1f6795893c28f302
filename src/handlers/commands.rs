use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;

use crate::bot_state::BotState;
use crate::conversation::Input;
use crate::handlers::club::{self, CONTENT_COMMAND, EVENTS_COMMAND, SEND_COFFEE_POLL_COMMAND};
use crate::handlers::utils::incoming_from_message;
use crate::handlers::{run_profile, HandlerResult};
use crate::models::Incoming;
use crate::services::OutgoingMessage;
use crate::Command;

pub const START_HELP_CALLBACK: &str = "start_help";

pub async fn command_handler(msg: Message, cmd: Command, state: BotState) -> HandlerResult {
    let Some(incoming) = incoming_from_message(&msg) else {
        log::debug!("Command without author in chat {} skipped", msg.chat.id);
        return Ok(());
    };

    match cmd {
        Command::Start => handle_start(&incoming, &state).await?,
        Command::Help => handle_help(&incoming, &state).await?,
        Command::Profile => run_profile(&state, &incoming, Input::Command).await,
        Command::Cancel => run_profile(&state, &incoming, Input::Cancel).await,
        Command::Events => handle_events(&incoming, &state, EVENTS_COMMAND).await?,
        Command::Content => handle_events(&incoming, &state, CONTENT_COMMAND).await?,
        Command::SendCoffeePoll => handle_send_coffee_poll(&incoming, &state).await?,
    }
    Ok(())
}

async fn handle_start(incoming: &Incoming, state: &BotState) -> HandlerResult {
    if !state.permissions.check_private_chat(incoming, "start").await {
        return Ok(());
    }

    let is_member = state
        .permissions
        .gate()
        .is_club_member(incoming.actor.id)
        .await;
    let mut message = OutgoingMessage::html(start_text(&incoming.actor.first_name, is_member));
    if is_member {
        message = message.keyboard(InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("💡 Как пользоваться ботом?", START_HELP_CALLBACK),
        ]]));
    }

    reply(state, incoming, message).await
}

pub async fn handle_help(incoming: &Incoming, state: &BotState) -> HandlerResult {
    if !state.permissions.check_private_chat(incoming, "help").await {
        return Ok(());
    }
    let is_admin = state.permissions.gate().is_admin(incoming.actor.id).await;
    reply(state, incoming, OutgoingMessage::html(help_text(is_admin))).await
}

async fn handle_send_coffee_poll(incoming: &Incoming, state: &BotState) -> HandlerResult {
    let job_timeout = state.config.poll_task.job_timeout;
    match club::coffee_poll_now(incoming, &state.permissions, &state.poll_job, job_timeout).await {
        Some(message) => reply(state, incoming, message).await,
        None => Ok(()),
    }
}

async fn handle_events(incoming: &Incoming, state: &BotState, command: &str) -> HandlerResult {
    match club::upcoming_events(incoming, &state.permissions, state.events.as_ref(), command).await {
        Some(message) => reply(state, incoming, message).await,
        None => Ok(()),
    }
}

async fn reply(state: &BotState, incoming: &Incoming, message: OutgoingMessage) -> HandlerResult {
    match incoming.message_id {
        Some(message_id) => {
            state
                .sender
                .reply(incoming.chat_id, message_id, message)
                .await?
        }
        None => state.sender.send(incoming.chat_id, message).await?,
    };
    Ok(())
}

pub fn start_text(first_name: &str, is_member: bool) -> String {
    let mut greeting = "Приветствую".to_string();
    if !first_name.is_empty() {
        greeting.push_str(&format!(", <b>{}</b>", html::escape(first_name)));
    }
    greeting.push_str("! 🎩");

    let about = "Я — <b>Дженкинс Вебстер</b>, потомственный дворецкий и верный помощник клуба \
        <i>\"Эволюция Кода\"</i> 🧐";
    if is_member {
        format!(
            "{}\n\n{}\n\nРад видеть тебя среди участников нашего клуба! \
            Я готов помочь тебе во всех твоих начинаниях. 🤵",
            greeting, about
        )
    } else {
        format!(
            "{}\n\n{}\n\nПозволь предложить тебе присоединиться к нашему изысканному сообществу \
            разработчиков и разработчиц, где я буду рад служить тебе всеми своими возможностями.",
            greeting, about
        )
    }
}

pub fn help_text(is_admin: bool) -> String {
    let mut text = String::from(
        "<b>📋 Доступные команды</b>\n\n\
        <b>🏠 Базовые</b>\n\
        └ /start - Приветственное сообщение\n\
        └ /help - Показать список моих команд\n\
        └ /cancel - Принудительно отменяет любой диалог\n\n\
        <b>👤 Профиль</b>\n\
        └ /profile - Управление своим профилем и поиск профилей клубчан\n\n\
        <b>📅 Мероприятия</b>\n\
        └ /events - Показать список предстоящих мероприятий\n\
        └ /content - То же, прежнее название команды\n\n\
        <b>🎲 Weekly Random Coffee</b>\n\
        - Опрос для участия в случайных встречах на следующей неделе (обычно по пятницам).\n\
        - Используй опрос, чтобы указать своё участие.",
    );

    if is_admin {
        text.push_str(&format!(
            "\n\n<b>🔐 Команды администратора</b>\n\
            └ /{} - Отправить опрос Random Coffee прямо сейчас",
            SEND_COFFEE_POLL_COMMAND
        ));
    }
    text
}
