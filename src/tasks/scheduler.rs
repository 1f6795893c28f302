use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::ConfigError;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Однократная работа, которую запускает планировщик
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    pub enabled: bool,
    pub weekday: Option<Weekday>,
    pub time: Option<NaiveTime>,
    pub tick_interval: Duration,
    pub job_timeout: Duration,
}

impl Default for ScheduledTaskConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            weekday: None,
            time: None,
            tick_interval: Duration::from_secs(60),
            job_timeout: Duration::from_secs(5 * 60),
        }
    }
}

/// Ближайший момент `weekday hour:minute` UTC строго после `now`, не дальше чем через 7 дней
pub fn compute_next_run(now: DateTime<Utc>, weekday: Weekday, hour: u32, minute: u32) -> DateTime<Utc> {
    let mut days_until_target = (weekday.num_days_from_monday() as i64
        - now.weekday().num_days_from_monday() as i64
        + 7)
        % 7;

    let candidate = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| now.date_naive().and_time(NaiveTime::MIN))
        .and_utc();

    if days_until_target == 0 && now < candidate {
        return candidate;
    }
    if days_until_target == 0 {
        days_until_target = 7;
    }

    candidate + chrono::Duration::days(days_until_target)
}

/// Еженедельная задача: цикл с грубым шагом проверяет, не наступил ли срок,
/// и запускает работу в отдельной задаче с ограничением по времени.
pub struct WeeklyTask {
    config: ScheduledTaskConfig,
    job: Arc<dyn ScheduledJob>,
    clock: Clock,
    stop: CancellationToken,
    next_run: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl WeeklyTask {
    pub fn new(config: ScheduledTaskConfig, job: Arc<dyn ScheduledJob>) -> Self {
        Self {
            config,
            job,
            clock: system_clock(),
            stop: CancellationToken::new(),
            next_run: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.next_run.lock().ok().and_then(|guard| *guard)
    }

    /// Запускает цикл. Выключенная задача - `Ok(None)`,
    /// включённая без дня или времени - ошибка конфигурации.
    pub fn start(&self) -> Result<Option<JoinHandle<()>>, ConfigError> {
        let name = self.job.name().to_string();
        if !self.config.enabled {
            log::info!("{}: task is disabled", name);
            return Ok(None);
        }
        let weekday = self
            .config
            .weekday
            .ok_or(ConfigError::MissingScheduleTarget("day"))?;
        let time = self
            .config
            .time
            .ok_or(ConfigError::MissingScheduleTarget("time"))?;

        log::info!(
            "{}: starting with time {:02}:{:02} UTC on {}",
            name,
            time.hour(),
            time.minute(),
            weekday
        );

        let job = self.job.clone();
        let clock = self.clock.clone();
        let stop = self.stop.clone();
        let next_run = self.next_run.clone();
        let tick_interval = self.config.tick_interval;
        let job_timeout = self.config.job_timeout;

        let handle = tokio::spawn(async move {
            let schedule = |now: DateTime<Utc>| compute_next_run(now, weekday, time.hour(), time.minute());
            let mut next = schedule(clock());
            store(&next_run, next);
            log::info!("{}: next run scheduled for {}", name, next);

            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        log::info!("{}: stopped", name);
                        return;
                    }
                    _ = ticker.tick() => {
                        let now = clock();
                        if now < next {
                            continue;
                        }

                        log::info!("{}: running scheduled job", name);
                        dispatch(job.clone(), job_timeout);

                        next = schedule(now);
                        store(&next_run, next);
                        log::info!("{}: next run scheduled for {}", name, next);
                    }
                }
            }
        });

        Ok(Some(handle))
    }

    /// Останавливает цикл; уже запущенная работа не прерывается
    pub fn stop(&self) {
        log::info!("{}: stopping", self.job.name());
        self.stop.cancel();
    }
}

fn store(slot: &Mutex<Option<DateTime<Utc>>>, value: DateTime<Utc>) {
    if let Ok(mut guard) = slot.lock() {
        *guard = Some(value);
    }
}

/// Запускает работу вне цикла планировщика
pub fn dispatch(job: Arc<dyn ScheduledJob>, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = job.name().to_string();
        match tokio::time::timeout(timeout, job.run()).await {
            Ok(Ok(())) => log::info!("{}: job finished", name),
            Ok(Err(e)) => log::error!("{}: job failed: {:#}", name, e),
            Err(_) => log::error!("{}: job timed out after {:?}", name, timeout),
        }
    })
}
