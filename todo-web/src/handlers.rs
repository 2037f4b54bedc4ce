use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use todo_core::{Database, DeadlineStatus, Filter, Stats, Tag, Task, parse_due_date};
use tracing::{info, warn};

use crate::error::{AppResult, error_response};
use crate::views::{self, IndexPage};

const DISPLAY_FORMAT: &str = "%b %d, %Y at %I:%M %p";

/// Parses an optional tag filter. Unknown names are ignored rather than rejected.
fn resolve_tag_filter(raw: Option<&str>) -> Option<Tag> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<Tag>() {
        Ok(tag) => Some(tag),
        Err(e) => {
            warn!("Ignoring tag filter: {}", e);
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub tag: Option<String>,
}

impl ListQuery {
    fn resolve(&self) -> (Filter, Option<Tag>) {
        (
            Filter::from_param(self.filter.as_deref()),
            resolve_tag_filter(self.tag.as_deref()),
        )
    }
}

/// The view a form was submitted from, so the redirect can return to it.
#[derive(Debug, Default, Deserialize)]
pub struct ViewForm {
    pub current_filter: Option<String>,
    pub tag_filter: Option<String>,
}

impl ViewForm {
    fn redirect(&self) -> Redirect {
        let filter = Filter::from_param(self.current_filter.as_deref());
        let tag = resolve_tag_filter(self.tag_filter.as_deref());
        Redirect::to(&views::index_url(filter, tag))
    }
}

pub async fn index(State(db): State<Database>, Query(query): Query<ListQuery>) -> AppResult<Html<String>> {
    let (filter, tag) = query.resolve();

    let tasks = db.list_tasks(filter, tag).await?;
    let stats = db.stats().await?;

    Ok(Html(views::render_index(&IndexPage {
        tasks: &tasks,
        filter,
        tag,
        stats,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskForm {
    pub task: String,
}

/// Blank submissions redirect back without creating anything, as a browser form expects.
pub async fn create_task(
    State(db): State<Database>,
    Query(query): Query<ListQuery>,
    Form(form): Form<CreateTaskForm>,
) -> AppResult<Redirect> {
    let (filter, tag) = query.resolve();

    if !form.task.trim().is_empty() {
        let id = db.create_task(&form.task).await?;
        info!("Created task {}", id);
    }

    Ok(Redirect::to(&views::index_url(filter, tag)))
}

#[derive(Debug, Deserialize)]
pub struct EditTaskForm {
    pub new_task_text: String,
    pub current_filter: Option<String>,
    pub tag_filter: Option<String>,
}

/// Blank text leaves the task unchanged and redirects back to the view.
pub async fn edit_task(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Form(form): Form<EditTaskForm>,
) -> AppResult<Redirect> {
    if !form.new_task_text.trim().is_empty() {
        info!("Updating text of task {}", task_id);
        db.update_task_text(task_id, &form.new_task_text).await?;
    }

    let view = ViewForm {
        current_filter: form.current_filter,
        tag_filter: form.tag_filter,
    };
    Ok(view.redirect())
}

pub async fn toggle_task(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Form(view): Form<ViewForm>,
) -> AppResult<Redirect> {
    info!("Toggling completion of task {}", task_id);
    db.toggle_task_completion(task_id).await?;
    Ok(view.redirect())
}

pub async fn pin_task(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Form(view): Form<ViewForm>,
) -> AppResult<Redirect> {
    info!("Toggling pin of task {}", task_id);
    db.toggle_task_pin(task_id).await?;
    Ok(view.redirect())
}

#[derive(Debug, Deserialize)]
pub struct ColorForm {
    pub color: String,
    pub current_filter: Option<String>,
    pub tag_filter: Option<String>,
}

pub async fn color_task(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Form(form): Form<ColorForm>,
) -> AppResult<Redirect> {
    info!("Setting color of task {} to {}", task_id, form.color);
    db.set_task_color(task_id, &form.color).await?;

    let view = ViewForm {
        current_filter: form.current_filter,
        tag_filter: form.tag_filter,
    };
    Ok(view.redirect())
}

pub async fn delete_task(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Form(view): Form<ViewForm>,
) -> AppResult<Redirect> {
    info!("Deleting task {}", task_id);
    db.delete_task(task_id).await?;
    Ok(view.redirect())
}

pub async fn clear_completed(State(db): State<Database>, Form(view): Form<ViewForm>) -> AppResult<Redirect> {
    let removed = db.clear_completed_tasks().await?;
    info!("Cleared {} completed tasks", removed);
    Ok(view.redirect())
}

#[derive(Debug, Deserialize)]
pub struct DueDateForm {
    #[serde(default)]
    pub due_date: String,
}

pub async fn set_due_date(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Form(form): Form<DueDateForm>,
) -> AppResult<Json<serde_json::Value>> {
    let due_date = parse_due_date(&form.due_date)?;
    info!("Setting due date of task {} to {:?}", task_id, due_date);

    db.set_task_due_date(task_id, due_date).await?;
    Ok(Json(json!({ "status": "success" })))
}

#[derive(Debug, Serialize)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    pub time_remaining: Option<String>,
    pub warning_message: Option<&'static str>,
    pub created_at_display: String,
    pub updated_at_display: String,
}

impl TaskDetails {
    fn new(task: Task) -> Self {
        let status = DeadlineStatus::evaluate(task.due_date, task.completed, Local::now().naive_local());

        TaskDetails {
            time_remaining: status.and_then(|s| s.time_remaining()),
            warning_message: status.and_then(|s| s.warning_message()),
            created_at_display: task.created_at.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
            updated_at_display: task.updated_at.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
            task,
        }
    }
}

pub async fn task_details(State(db): State<Database>, Path(task_id): Path<i64>) -> AppResult<Response> {
    let Some(task) = db.get_task(task_id).await? else {
        return Ok(error_response(StatusCode::NOT_FOUND, "Task not found"));
    };

    Ok(Json(TaskDetails::new(task)).into_response())
}

/// Drag-and-drop clients send ids as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TaskIdParam {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub task_ids: Vec<TaskIdParam>,
}

pub async fn reorder_tasks(State(db): State<Database>, Json(request): Json<ReorderRequest>) -> AppResult<Response> {
    let mut task_ids = Vec::with_capacity(request.task_ids.len());
    for param in request.task_ids {
        let id = match param {
            TaskIdParam::Number(id) => id,
            TaskIdParam::Text(text) => match text.trim().parse() {
                Ok(id) => id,
                Err(_) => {
                    return Ok(error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Invalid task ID: {text}"),
                    ));
                }
            },
        };
        task_ids.push(id);
    }

    info!("Reordering {} tasks", task_ids.len());
    db.reorder_tasks(&task_ids).await?;

    Ok(Json(json!({ "status": "success" })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub tag_name: String,
}

pub async fn add_tag(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Json(request): Json<TagRequest>,
) -> AppResult<Response> {
    let tag: Tag = request.tag_name.parse()?;

    info!("Adding tag {} to task {}", tag, task_id);
    db.add_tag(task_id, tag).await?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "added", "tag": tag }))).into_response())
}

pub async fn remove_tag(
    State(db): State<Database>,
    Path(task_id): Path<i64>,
    Json(request): Json<TagRequest>,
) -> AppResult<Response> {
    let tag: Tag = request.tag_name.parse()?;

    info!("Removing tag {} from task {}", tag, task_id);
    if !db.remove_tag(task_id, tag).await? {
        return Ok(error_response(StatusCode::NOT_FOUND, "Tag not found on task"));
    }

    Ok(Json(json!({ "status": "removed", "tag": tag })).into_response())
}

pub async fn list_tasks(State(db): State<Database>, Query(query): Query<ListQuery>) -> AppResult<Json<Vec<Task>>> {
    let (filter, tag) = query.resolve();
    Ok(Json(db.list_tasks(filter, tag).await?))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: Stats,
    pub completion_percentage: u8,
}

pub async fn stats(State(db): State<Database>) -> AppResult<Json<StatsResponse>> {
    let stats = db.stats().await?;
    Ok(Json(StatsResponse {
        completion_percentage: stats.completion_percentage(),
        stats,
    }))
}
