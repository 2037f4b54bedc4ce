use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Task text must not be empty")]
    EmptyText,
    #[error("Tag name required")]
    EmptyTagName,
    #[error("Tag \"{0}\" is not a valid predefined tag.")]
    InvalidTag(String),
    #[error("\"{0}\" is not a valid hex color")]
    InvalidColor(String),
    #[error("\"{0}\" is not a valid YYYY-MM-DD date")]
    InvalidDueDate(String),
    #[error("No task IDs provided")]
    EmptyReorder,
    #[error("Could not find a state directory for the database")]
    NoStateDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl TodoError {
    /// True when the error was caused by caller input rather than storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TodoError::EmptyText
                | TodoError::EmptyTagName
                | TodoError::InvalidTag(_)
                | TodoError::InvalidColor(_)
                | TodoError::InvalidDueDate(_)
                | TodoError::EmptyReorder
        )
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
