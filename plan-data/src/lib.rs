//! Loaders for guideline schedules and saved questionnaire answers.

mod answers_loader;
mod schedule_loader;

pub use answers_loader::{AnswersLoader, AnswersLoaderError};
pub use schedule_loader::{ScheduleLoader, ScheduleLoaderError, ScheduleRecord};
