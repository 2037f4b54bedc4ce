mod db;
mod deadline;
mod error;
mod models;
mod stats;
mod tags;

pub use db::Database;
pub use deadline::DeadlineStatus;
pub use error::{Result, TodoError};
pub use models::{DEFAULT_COLOR, Filter, Task, parse_due_date, validate_color, validate_text};
pub use stats::Stats;
pub use tags::Tag;
