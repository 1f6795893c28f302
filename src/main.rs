use std::sync::Arc;

use anyhow::Context;
use teloxide::{prelude::*, utils::command::BotCommands};

mod bot_state;
mod config;
mod conversation;
mod database;
mod handlers;
mod models;
mod services;
mod session_store;
mod tasks;

#[cfg(test)]
mod testing;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::conversation::ProfileConversation;
use crate::database::{
    Database, PgEventRepository, PgPollRepository, PgProfileRepository, PgUserRepository,
};
use crate::handlers::{callback_handler, command_handler, message_handler};
use crate::services::{MessageSender, PermissionsService, TelegramPermissionGate, TelegramSender};
use crate::session_store::SessionStore;
use crate::tasks::{RandomCoffeePollJob, WeeklyTask};

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "показать помощь")]
    Help,
    #[command(description = "профили участников клуба")]
    Profile,
    #[command(description = "отменить текущий диалог")]
    Cancel,
    #[command(description = "ближайшие мероприятия клуба")]
    Events,
    #[command(description = "то же, что /events")]
    Content,
    #[command(rename = "sendCoffeePoll", description = "отправить опрос Random Coffee")]
    SendCoffeePoll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting club bot with PostgreSQL...");

    let config = Config::from_env().context("failed to load configuration")?;

    let db = Database::new(&config.database_url)
        .await
        .context("failed to connect to database")?;
    db.init().await.context("failed to initialize schema")?;
    log::info!("✅ Database initialized");

    let bot = Bot::from_env();

    let sender: Arc<dyn MessageSender> = Arc::new(TelegramSender::new(bot.clone()));
    let gate = Arc::new(TelegramPermissionGate::new(bot.clone(), config.super_group_chat_id));
    let permissions = PermissionsService::new(gate, sender.clone());

    let profile = ProfileConversation::new(
        SessionStore::new(),
        sender.clone(),
        permissions.clone(),
        Arc::new(PgUserRepository::new(db.pool.clone())),
        Arc::new(PgProfileRepository::new(db.pool.clone())),
    );
    let poll_job = RandomCoffeePollJob::new(
        sender.clone(),
        Arc::new(PgPollRepository::new(db.pool.clone())),
        config.super_group_chat_id,
        config.coffee_topic_id,
    );

    let poll_task_config = config.poll_task.clone();
    let events = Arc::new(PgEventRepository::new(db.pool.clone()));
    let state = BotState::new(config, sender, permissions, profile, poll_job, events);

    let poll_task = WeeklyTask::new(poll_task_config, state.poll_job.clone());
    let poll_handle = poll_task
        .start()
        .context("failed to start random coffee poll task")?;

    // Фоновая задача для очистки брошенных диалогов
    let state_clone = state.clone();
    tokio::spawn(async move {
        handlers::cleanup_sessions_task(state_clone).await;
    });

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    poll_task.stop();
    if let Some(handle) = poll_handle {
        if let Err(e) = handle.await {
            log::error!("Random coffee poll task panicked: {}", e);
        }
    }
    log::info!("👋 Bot stopped");

    Ok(())
}
