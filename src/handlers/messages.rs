use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::conversation::Input;
use crate::handlers::utils::incoming_from_message;
use crate::handlers::{run_profile, HandlerResult};

pub async fn message_handler(msg: Message, state: BotState) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    // Пропускаем команды - они уже обработаны в command_handler
    if text.starts_with('/') {
        return Ok(());
    }
    let Some(incoming) = incoming_from_message(&msg) else {
        return Ok(());
    };

    run_profile(&state, &incoming, Input::Text(text.to_string())).await;
    Ok(())
}
