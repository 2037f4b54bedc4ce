use axum::{
    Router,
    routing::{get, post},
};
use todo_core::Database;
use tower_http::trace::TraceLayer;

use crate::handlers;

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::create_task))
        .route("/edit/{task_id}", post(handlers::edit_task))
        .route("/toggle/{task_id}", post(handlers::toggle_task))
        .route("/pin/{task_id}", post(handlers::pin_task))
        .route("/color/{task_id}", post(handlers::color_task))
        .route("/delete/{task_id}", post(handlers::delete_task))
        .route("/clear-completed", post(handlers::clear_completed))
        .route("/set-duedate/{task_id}", post(handlers::set_due_date))
        .nest("/api", create_api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

fn create_api_router() -> Router<Database> {
    Router::new()
        .route("/tasks", get(handlers::list_tasks))
        .route("/stats", get(handlers::stats))
        .route("/task-details/{task_id}", get(handlers::task_details))
        .route("/reorder", post(handlers::reorder_tasks))
        .route(
            "/tags/{task_id}",
            post(handlers::add_tag).delete(handlers::remove_tag),
        )
}
