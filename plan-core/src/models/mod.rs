mod income;
mod parent;
pub mod paths;
mod question;
mod schedule;

pub use income::IncomeRecord;
pub use parent::Parent;
pub use question::{CustomValidator, Question, QuestionKind, Section, ValidationRule};
pub use schedule::{
    BracketLookup, SCHEDULE_CHILD_COLUMNS, ScheduleError, SupportBracket, SupportSchedule,
};
