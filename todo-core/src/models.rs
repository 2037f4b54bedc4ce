use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::{Result, TodoError};

pub const DEFAULT_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub pinned: bool,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub position: i64,
    /// Attached tag names, sorted by name.
    #[sqlx(skip)]
    pub tags: Vec<String>,
}

/// Which tasks a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Done,
    Undone,
    Pinned,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::All, Filter::Done, Filter::Undone, Filter::Pinned];

    /// Unknown or missing values fall back to `All`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("done") => Filter::Done,
            Some("undone") => Filter::Undone,
            Some("pinned") => Filter::Pinned,
            _ => Filter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Done => "done",
            Filter::Undone => "undone",
            Filter::Pinned => "pinned",
        }
    }

    pub(crate) fn where_clause(&self) -> Option<&'static str> {
        match self {
            Filter::All => None,
            Filter::Done => Some("t.completed = 1"),
            Filter::Undone => Some("t.completed = 0"),
            Filter::Pinned => Some("t.pinned = 1"),
        }
    }
}

/// Trims task text and rejects it when nothing is left.
pub fn validate_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TodoError::EmptyText);
    }
    Ok(trimmed)
}

/// Accepts `#rgb` and `#rrggbb` and returns the lowercased color.
pub fn validate_color(color: &str) -> Result<String> {
    let trimmed = color.trim();
    let valid = trimmed
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));

    if !valid {
        return Err(TodoError::InvalidColor(color.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// An empty string clears the due date.
pub fn parse_due_date(value: &str) -> Result<Option<NaiveDate>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| TodoError::InvalidDueDate(value.to_string()))
}
