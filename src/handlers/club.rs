//! Команды клуба без диалога: ответ собирается целиком и отправляется
//! одним сообщением. `None` означает, что пользователю уже отказано.

use std::time::Duration;

use teloxide::utils::html;

use crate::database::EventRepository;
use crate::models::{Event, Incoming};
use crate::services::{OutgoingMessage, PermissionsService};
use crate::tasks::{JobError, PollOutcome, RandomCoffeePollJob};

pub const SEND_COFFEE_POLL_COMMAND: &str = "sendCoffeePoll";
pub const EVENTS_COMMAND: &str = "events";
pub const CONTENT_COMMAND: &str = "content";

const EVENTS_LIMIT: i64 = 10;
const CALENDAR_URL: &str = "https://itbeard.com/s/evo-calendar";

/// Ручной запуск еженедельного опроса тем же исполнителем, что и по расписанию
pub async fn coffee_poll_now(
    incoming: &Incoming,
    permissions: &PermissionsService,
    job: &RandomCoffeePollJob,
    job_timeout: Duration,
) -> Option<OutgoingMessage> {
    if !permissions
        .check_admin_and_private_chat(incoming, SEND_COFFEE_POLL_COMMAND)
        .await
    {
        return None;
    }

    log::info!("🎲 Admin {} requested the coffee poll", incoming.actor.id);
    let text = match tokio::time::timeout(job_timeout, job.send_poll()).await {
        Ok(Ok(PollOutcome::Recorded { record, .. })) => format!(
            "✅ Опрос отправлен. Неделя встреч начинается {}.",
            record.week_start_date.format("%d.%m.%Y")
        ),
        Ok(Ok(PollOutcome::Skipped)) => {
            "⚠️ Чат клуба не настроен (SUPER_GROUP_CHAT_ID), опрос не отправлен.".to_string()
        }
        Ok(Err(JobError::Persistence { message_id, .. })) => format!(
            "⚠️ Опрос отправлен, но не сохранён в базе. ID сообщения с опросом: {}.",
            message_id
        ),
        Ok(Err(e)) => {
            log::error!("Manual coffee poll failed: {}", e);
            "❌ Не удалось отправить опрос.".to_string()
        }
        Err(_) => {
            log::error!("Manual coffee poll timed out after {:?}", job_timeout);
            "❌ Отправка опроса заняла слишком много времени.".to_string()
        }
    };
    Some(OutgoingMessage::html(text))
}

/// Список актуальных мероприятий для участников клуба
pub async fn upcoming_events(
    incoming: &Incoming,
    permissions: &PermissionsService,
    events: &dyn EventRepository,
    command: &str,
) -> Option<OutgoingMessage> {
    if !permissions.check_private_chat(incoming, command).await {
        return None;
    }
    if !permissions.check_club_member(incoming, command).await {
        return None;
    }

    let text = match events.last_actual(EVENTS_LIMIT).await {
        Ok(list) if list.is_empty() => "На данный момент нет актуальных мероприятий.".to_string(),
        Ok(list) => format_events(&list, "📋 Список ближайших мероприятий"),
        Err(e) => {
            log::error!("Error during events retrieval for user {}: {}", incoming.actor.id, e);
            "Ошибка при получении списка мероприятий.".to_string()
        }
    };
    Some(OutgoingMessage::html(text))
}

pub fn format_events(events: &[Event], title: &str) -> String {
    let mut text = format!("<b>{}</b>\n", html::escape(title));
    for event in events {
        let started = event
            .started_at
            .map(|at| at.format("%d.%m.%Y в %H:%M UTC").to_string())
            .unwrap_or_else(|| "не указано".to_string());
        text.push_str(&format!(
            "\n<b>{}</b>\n└ {} <i>{}</i>, старт: <i>{}</i>\n",
            html::escape(&event.name),
            event.kind_emoji(),
            html::escape(&event.kind),
            started
        ));
    }
    text.push_str(&format!(
        "\nБольше информации о мероприятиях смотри в <a href=\"{}\">клубном календаре</a>.",
        CALENDAR_URL
    ));
    text
}
