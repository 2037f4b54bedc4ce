use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::{Result, TodoError};
use crate::models::{Filter, Task, validate_color, validate_text};
use crate::tags::Tag;

const TASK_COLUMNS: &str =
    "t.id, t.text, t.completed, t.pinned, t.color, t.created_at, t.updated_at, t.due_date, t.position";

#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Opens the database in the user's state directory.
    pub async fn connect() -> Result<Self> {
        let db_file = Self::default_path()?;
        Self::open(&db_file).await
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::state_dir()
            .or_else(dirs::config_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local/state")))
            .ok_or(TodoError::NoStateDir)?;

        Ok(config_dir.join("todo").join("data").join("todo.db"))
    }

    /// Opens (or creates) the database file at `path`, creating missing parent directories.
    pub async fn open(path: &Path) -> Result<Self> {
        info!("Opening task database at {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::migrate(pool).await
    }

    /// A private database that lives as long as the returned handle.
    pub async fn in_memory() -> Result<Self> {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()?
            .foreign_keys(true);

        // Every connection to :memory: is a separate database, so keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Database { pool })
    }

    pub async fn create_task(&self, text: &str) -> Result<i64> {
        let text = validate_text(text)?;

        let result = sqlx::query(
            "INSERT INTO tasks (text, position)
             VALUES (?, (SELECT COALESCE(MAX(position), 0) + 1 FROM tasks))",
        )
        .bind(text)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Created task {}", id);
        Ok(id)
    }

    pub async fn update_task_text(&self, task_id: i64, text: &str) -> Result<()> {
        let text = validate_text(text)?;

        sqlx::query("UPDATE tasks SET text = ? WHERE id = ?")
            .bind(text)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn toggle_task_completion(&self, task_id: i64) -> Result<()> {
        sqlx::query("UPDATE tasks SET completed = NOT completed WHERE id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn toggle_task_pin(&self, task_id: i64) -> Result<()> {
        sqlx::query("UPDATE tasks SET pinned = NOT pinned WHERE id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_task_color(&self, task_id: i64, color: &str) -> Result<()> {
        let color = validate_color(color)?;

        sqlx::query("UPDATE tasks SET color = ? WHERE id = ?")
            .bind(color)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_task_due_date(&self, task_id: i64, due_date: Option<NaiveDate>) -> Result<()> {
        sqlx::query("UPDATE tasks SET due_date = ? WHERE id = ?")
            .bind(due_date)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_task_position(&self, task_id: i64, position: i64) -> Result<()> {
        sqlx::query("UPDATE tasks SET position = ? WHERE id = ?")
            .bind(position)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gives the listed tasks positions 1..=N in the order given.
    pub async fn reorder_tasks(&self, task_ids: &[i64]) -> Result<()> {
        if task_ids.is_empty() {
            return Err(TodoError::EmptyReorder);
        }
        debug!("Reordering {} tasks", task_ids.len());

        let mut tx = self.pool.begin().await?;
        for (index, task_id) in task_ids.iter().enumerate() {
            sqlx::query("UPDATE tasks SET position = ? WHERE id = ?")
                .bind(index as i64 + 1)
                .bind(*task_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes every completed task and returns how many were removed.
    pub async fn clear_completed_tasks(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE completed = 1")
            .execute(&self.pool)
            .await?;

        debug!("Cleared {} completed tasks", result.rows_affected());
        Ok(result.rows_affected())
    }

    pub async fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;

        match task {
            Some(mut task) => {
                task.tags = self.get_tags_for_task(task.id).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Pinned tasks come first, then ascending position, then most recently updated.
    pub async fn list_tasks(&self, filter: Filter, tag: Option<Tag>) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks t");
        let mut clauses = Vec::new();

        if tag.is_some() {
            sql.push_str(" JOIN task_tags tt ON t.id = tt.task_id JOIN tags g ON tt.tag_id = g.id");
            clauses.push("g.name = ?");
        }
        if let Some(clause) = filter.where_clause() {
            clauses.push(clause);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY t.pinned DESC, t.position ASC, t.updated_at DESC");

        let mut query = sqlx::query_as::<_, Task>(&sql);
        if let Some(tag) = tag {
            query = query.bind(tag.as_str());
        }
        let mut tasks = query.fetch_all(&self.pool).await?;

        self.attach_tags(&mut tasks).await?;
        Ok(tasks)
    }

    async fn attach_tags(&self, tasks: &mut [Task]) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; tasks.len()].join(", ");
        let sql = format!(
            "SELECT tt.task_id, g.name FROM task_tags tt
             JOIN tags g ON g.id = tt.tag_id
             WHERE tt.task_id IN ({placeholders})
             ORDER BY g.name"
        );

        let mut query = sqlx::query_as::<_, (i64, String)>(&sql);
        for task in tasks.iter() {
            query = query.bind(task.id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_task: HashMap<i64, Vec<String>> = HashMap::new();
        for (task_id, name) in rows {
            by_task.entry(task_id).or_default().push(name);
        }
        for task in tasks.iter_mut() {
            task.tags = by_task.remove(&task.id).unwrap_or_default();
        }

        Ok(())
    }
}
