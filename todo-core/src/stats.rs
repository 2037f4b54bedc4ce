use serde::Serialize;

use crate::db::Database;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: i64,
    pub completed: i64,
}

impl Stats {
    /// Share of completed tasks, rounded to a whole percent. Zero when there are no tasks.
    pub fn completion_percentage(&self) -> u8 {
        if self.total <= 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u8
    }
}

impl Database {
    pub async fn stats(&self) -> Result<Stats> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(id), COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0) FROM tasks",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Stats { total, completed })
    }
}
