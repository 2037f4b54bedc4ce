use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Where a task stands relative to the end of its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeadlineStatus {
    CompletedLate,
    CompletedOnTime,
    Overdue,
    Remaining { days: i64, hours: i64 },
}

impl DeadlineStatus {
    /// The deadline is the last second of `due_date`. Returns `None` without a due date.
    pub fn evaluate(due_date: Option<NaiveDate>, completed: bool, now: NaiveDateTime) -> Option<Self> {
        let deadline = due_date?.and_hms_opt(23, 59, 59)?;
        let past_deadline = now > deadline;

        let status = match (completed, past_deadline) {
            (true, true) => DeadlineStatus::CompletedLate,
            (true, false) => DeadlineStatus::CompletedOnTime,
            (false, true) => DeadlineStatus::Overdue,
            (false, false) => {
                let delta = deadline - now;
                DeadlineStatus::Remaining {
                    days: delta.num_days(),
                    hours: (delta.num_seconds() % 86_400) / 3_600,
                }
            }
        };
        Some(status)
    }

    pub fn warning_message(&self) -> Option<&'static str> {
        match self {
            DeadlineStatus::CompletedLate => Some("Completed after deadline."),
            DeadlineStatus::CompletedOnTime => Some("Completed on time."),
            DeadlineStatus::Overdue => Some("Did not complete the task on time"),
            DeadlineStatus::Remaining { .. } => None,
        }
    }

    pub fn time_remaining(&self) -> Option<String> {
        match *self {
            DeadlineStatus::Remaining { days, hours } if days > 0 => {
                Some(format!("{days} days and {hours} hours remaining"))
            }
            DeadlineStatus::Remaining { hours, .. } => Some(format!("{hours} hours remaining")),
            _ => None,
        }
    }
}
