use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::conversation::{Input, ProfileAction};
use crate::handlers::commands::{handle_help, START_HELP_CALLBACK};
use crate::handlers::utils::incoming_from_callback;
use crate::handlers::{run_profile, HandlerResult};

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: BotState) -> HandlerResult {
    // Ответ на нажатие убирает индикатор загрузки у клиента
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        log::warn!("Failed to answer callback query from {}: {}", q.from.id, e);
    }

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(incoming) = incoming_from_callback(&q) else {
        log::debug!("Callback {:?} without message from {} skipped", data, q.from.id);
        return Ok(());
    };

    if data == START_HELP_CALLBACK {
        return handle_help(&incoming, &state).await;
    }

    match ProfileAction::parse(data) {
        Ok(action) => run_profile(&state, &incoming, Input::Action(action)).await,
        Err(e) => log::warn!("Callback from user {} ignored: {}", incoming.actor.id, e),
    }
    Ok(())
}
