use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use todo_core::TodoError;
use tracing::{error, warn};

/// Wraps store errors so handlers can use `?`.
#[derive(Debug)]
pub struct AppError(pub TodoError);

impl From<TodoError> for AppError {
    fn from(err: TodoError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_validation() {
            warn!("Rejected request: {}", self.0);
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            error!("Request failed: {}", self.0);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        };

        error_response(status, message)
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({ "status": "error", "message": message.into() });
    (status, Json(body)).into_response()
}

pub type AppResult<T> = Result<T, AppError>;
