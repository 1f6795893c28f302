use std::sync::Arc;

use chrono::Utc;

use crate::config::Config;
use crate::conversation::ProfileConversation;
use crate::database::EventRepository;
use crate::services::{MessageSender, PermissionsService};
use crate::session_store::SessionStore;
use crate::tasks::RandomCoffeePollJob;

/// Общее состояние, которое dptree передаёт в обработчики
#[derive(Clone)]
pub struct BotState {
    pub config: Arc<Config>,
    pub sender: Arc<dyn MessageSender>,
    pub permissions: PermissionsService,
    pub profile: Arc<ProfileConversation>,
    pub poll_job: Arc<RandomCoffeePollJob>,
    pub events: Arc<dyn EventRepository>,
}

impl BotState {
    pub fn new(
        config: Config,
        sender: Arc<dyn MessageSender>,
        permissions: PermissionsService,
        profile: ProfileConversation,
        poll_job: RandomCoffeePollJob,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sender,
            permissions,
            profile: Arc::new(profile),
            poll_job: Arc::new(poll_job),
            events,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        self.profile.sessions()
    }

    /// Удаляет диалоги, к которым давно не возвращались
    pub async fn cleanup_sessions(&self) -> usize {
        let max_idle = match chrono::Duration::from_std(self.config.session_idle_timeout) {
            Ok(max_idle) => max_idle,
            Err(e) => {
                log::error!("Invalid session idle timeout: {}", e);
                return 0;
            }
        };

        let evicted = self.sessions().evict_idle(max_idle, Utc::now()).await;
        if evicted > 0 {
            log::info!("🧹 {} idle profile dialogs evicted", evicted);
        }
        evicted
    }
}
