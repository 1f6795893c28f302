pub mod callbacks;
pub mod club;
pub mod commands;
pub mod messages;
pub mod utils;

pub use callbacks::callback_handler;
pub use commands::command_handler;
pub use messages::message_handler;

use std::error::Error;
use std::time::Duration;

use tokio::time;

use crate::bot_state::BotState;
use crate::conversation::{Input, Outcome};
use crate::models::Incoming;

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// Передаёт вход в диалог профиля. Ошибки уже сообщены пользователю,
/// здесь они только логируются.
pub async fn run_profile(state: &BotState, incoming: &Incoming, input: Input) {
    let user_id = incoming.actor.id;
    match state.profile.handle(incoming, input).await {
        Ok(Outcome::Ignored) => log::debug!("Input from user {} ignored", user_id),
        Ok(outcome) => log::debug!("Profile dialog of user {}: {:?}", user_id, outcome),
        Err(e) => log::error!("Profile dialog of user {} failed: {}", user_id, e),
    }
}

pub async fn cleanup_sessions_task(state: BotState) {
    let mut interval = time::interval(SESSION_CLEANUP_INTERVAL);
    loop {
        interval.tick().await;
        state.cleanup_sessions().await;
    }
}
