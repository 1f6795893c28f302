use std::env;
use std::time::Duration;

use chrono::{NaiveTime, Weekday};
use teloxide::types::ChatId;

use crate::tasks::ScheduledTaskConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
    /// Задача включена, но не задан день или время запуска
    #[error("scheduled task is enabled but its {0} is not set")]
    MissingScheduleTarget(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub super_group_chat_id: Option<ChatId>,
    pub coffee_topic_id: Option<i32>,
    pub poll_task: ScheduledTaskConfig,
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        // 0 - то же, что не задано
        let super_group_chat_id = parse::<i64>("SUPER_GROUP_CHAT_ID", var("SUPER_GROUP_CHAT_ID"))?
            .filter(|id| *id != 0)
            .map(ChatId);
        let coffee_topic_id = parse::<i32>("RANDOM_COFFEE_TOPIC_ID", var("RANDOM_COFFEE_TOPIC_ID"))?
            .filter(|id| *id != 0);

        let enabled = match var("RANDOM_COFFEE_POLL_TASK_ENABLED") {
            Some(value) => parse_bool("RANDOM_COFFEE_POLL_TASK_ENABLED", &value)?,
            None => false,
        };
        let weekday = parse::<Weekday>("RANDOM_COFFEE_POLL_DAY", var("RANDOM_COFFEE_POLL_DAY"))?;
        let time = var("RANDOM_COFFEE_POLL_TIME")
            .map(|value| {
                NaiveTime::parse_from_str(&value, "%H:%M").map_err(|_| ConfigError::Invalid {
                    name: "RANDOM_COFFEE_POLL_TIME",
                    value,
                })
            })
            .transpose()?;

        let defaults = ScheduledTaskConfig::default();
        let tick_interval = parse::<u64>("RANDOM_COFFEE_POLL_TICK_SECS", var("RANDOM_COFFEE_POLL_TICK_SECS"))?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.tick_interval);

        let session_idle_timeout = parse::<u64>("SESSION_IDLE_TIMEOUT_SECS", var("SESSION_IDLE_TIMEOUT_SECS"))?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(24 * 60 * 60));

        Ok(Self {
            database_url,
            super_group_chat_id,
            coffee_topic_id,
            poll_task: ScheduledTaskConfig {
                enabled,
                weekday,
                time,
                tick_interval,
                ..defaults
            },
            session_idle_timeout,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| value.parse::<T>().map_err(|_| ConfigError::Invalid { name, value }))
        .transpose()
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
