use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::error::{Result, TodoError};

/// The fixed set of category tags a task can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Personal,
    Office,
    Urgent,
    Shopping,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::Personal, Tag::Office, Tag::Urgent, Tag::Shopping];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Personal => "personal",
            Tag::Office => "office",
            Tag::Urgent => "urgent",
            Tag::Shopping => "shopping",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        if name.is_empty() {
            return Err(TodoError::EmptyTagName);
        }

        Tag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == name)
            .ok_or(TodoError::InvalidTag(name))
    }
}

impl Database {
    /// Links `tag` to the task. Linking twice, or linking to a missing task, does nothing.
    pub async fn add_tag(&self, task_id: i64, tag: Tag) -> Result<()> {
        debug!("Adding tag {} to task {}", tag, task_id);

        sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
            .bind(tag.as_str())
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "INSERT OR IGNORE INTO task_tags (task_id, tag_id)
             SELECT t.id, g.id FROM tasks t, tags g WHERE t.id = ? AND g.name = ?",
        )
        .bind(task_id)
        .bind(tag.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Unlinks `tag` from the task. Returns false when the task did not carry it.
    pub async fn remove_tag(&self, task_id: i64, tag: Tag) -> Result<bool> {
        debug!("Removing tag {} from task {}", tag, task_id);

        let result = sqlx::query(
            "DELETE FROM task_tags
             WHERE task_id = ? AND tag_id = (SELECT id FROM tags WHERE name = ?)",
        )
        .bind(task_id)
        .bind(tag.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_tags_for_task(&self, task_id: i64) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT g.name FROM tags g
             JOIN task_tags tt ON g.id = tt.tag_id
             WHERE tt.task_id = ?
             ORDER BY g.name",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
