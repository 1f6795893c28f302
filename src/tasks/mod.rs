pub mod coffee_poll;
pub mod scheduler;

pub use coffee_poll::{JobError, PollOutcome, RandomCoffeePollJob};
pub use scheduler::{ScheduledTaskConfig, WeeklyTask};
