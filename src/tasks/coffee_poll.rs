use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use teloxide::types::ChatId;

use super::scheduler::{system_clock, Clock, ScheduledJob};
use crate::database::{PollRepository, RepositoryError};
use crate::models::PollRecord;
use crate::services::{MessageSender, PollRequest, SenderError, SentPoll};

const TASK_NAME: &str = "Random Coffee Poll Task";

const QUESTION: &str = "📝 Готов ли ты участвовать в рандомных кофе-встречах на следующей неделе?\n\n\
    Как это работает: в конце каждой недели я спрашиваю здесь, хочешь ли ты участвовать во встречах. \
    Если ответишь «да», то в понедельник тебя могут объединить в пару с другим участником для неформального общения!";
const OPTIONS: [&str; 2] = ["Да, участвую! ☕️", "Нет, пропускаю эту неделю"];

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("failed to send poll: {0}")]
    Send(#[from] SenderError),
    /// Опрос уже у пользователей, откат не выполняется
    #[error("poll message {message_id} was sent but not saved: {source}")]
    Persistence {
        message_id: i32,
        #[source]
        source: RepositoryError,
    },
}

/// Что сделал запуск
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Чат клуба не настроен
    Skipped,
    Recorded { poll_id: i64, record: PollRecord },
}

/// Ближайший понедельник 00:00 UTC строго после `now`
pub fn week_start_date(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_until_monday = 7 - now.weekday().num_days_from_monday() as i64;
    (now.date_naive() + Duration::days(days_until_monday))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Отправляет еженедельный опрос и сохраняет запись о нём
pub struct RandomCoffeePollJob {
    sender: Arc<dyn MessageSender>,
    polls: Arc<dyn PollRepository>,
    chat_id: Option<ChatId>,
    topic_id: Option<i32>,
    clock: Clock,
}

impl RandomCoffeePollJob {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        polls: Arc<dyn PollRepository>,
        chat_id: Option<ChatId>,
        topic_id: Option<i32>,
    ) -> Self {
        Self {
            sender,
            polls,
            chat_id,
            topic_id,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn send_poll(&self) -> Result<PollOutcome, JobError> {
        let Some(chat_id) = self.chat_id else {
            log::info!("{}: SUPER_GROUP_CHAT_ID is not configured. Skipping poll.", TASK_NAME);
            return Ok(PollOutcome::Skipped);
        };

        log::info!("{}: sending poll to chat {}", TASK_NAME, chat_id);
        let request = PollRequest {
            question: QUESTION.to_string(),
            options: OPTIONS.iter().map(|o| o.to_string()).collect(),
            is_anonymous: false,
            allows_multiple_answers: false,
            topic_id: self.topic_id,
        };
        let sent = self.sender.send_poll(chat_id, request).await?;

        self.save(sent).await
    }

    async fn save(&self, sent: SentPoll) -> Result<PollOutcome, JobError> {
        let week_start = week_start_date((self.clock)());
        log::info!(
            "{}: calculated week start date {} (UTC)",
            TASK_NAME,
            week_start.format("%Y-%m-%d")
        );

        let record = PollRecord {
            message_id: sent.message_id.0,
            chat_id: sent.chat_id.0,
            telegram_poll_id: sent.poll_id,
            week_start_date: week_start,
        };

        match self.polls.create_poll(&record).await {
            Ok(poll_id) => {
                log::info!(
                    "{}: poll saved with id {}, message id {}, week start {}",
                    TASK_NAME,
                    poll_id,
                    record.message_id,
                    week_start.format("%Y-%m-%d")
                );
                Ok(PollOutcome::Recorded { poll_id, record })
            }
            Err(source) => {
                log::error!(
                    "{}: failed to save poll to DB: {}. Poll message id: {}",
                    TASK_NAME,
                    source,
                    record.message_id
                );
                Err(JobError::Persistence {
                    message_id: record.message_id,
                    source,
                })
            }
        }
    }
}

#[async_trait]
impl ScheduledJob for RandomCoffeePollJob {
    fn name(&self) -> &str {
        TASK_NAME
    }

    async fn run(&self) -> anyhow::Result<()> {
        self.send_poll().await?;
        Ok(())
    }
}
