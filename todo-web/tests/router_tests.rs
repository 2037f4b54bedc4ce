use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use todo_core::{Database, Filter, Tag};
use todo_web::create_router;
use tower::ServiceExt;

async fn setup() -> (Router, Database) {
    let db = Database::in_memory().await.unwrap();
    (create_router(db.clone()), db)
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_index_renders_tasks_and_progress() {
    let (app, db) = setup().await;
    let id = db.create_task("Write report").await.unwrap();
    db.create_task("Water plants").await.unwrap();
    db.toggle_task_completion(id).await.unwrap();

    let response = send(&app, get_request("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Write report"));
    assert!(html.contains("Water plants"));
    assert!(html.contains("1 of 2 tasks completed (50%)"));
}

#[tokio::test]
async fn test_index_links_task_controls_to_routes() {
    let (app, db) = setup().await;
    let id = db.create_task("plan trip").await.unwrap();

    let html = body_string(send(&app, get_request("/")).await).await;
    assert!(html.contains(&format!("/set-duedate/{id}")));
    assert!(html.contains(&format!("/api/tags/{id}")));
    assert!(html.contains(&format!("/api/task-details/{id}")));
    assert!(html.contains("/api/reorder"));
    assert!(html.contains("<script"));
}

#[tokio::test]
async fn test_index_applies_filter() {
    let (app, db) = setup().await;
    let done = db.create_task("finished thing").await.unwrap();
    db.create_task("open thing").await.unwrap();
    db.toggle_task_completion(done).await.unwrap();

    let html = body_string(send(&app, get_request("/?filter=done")).await).await;
    assert!(html.contains("finished thing"));
    assert!(!html.contains("open thing"));
}

#[tokio::test]
async fn test_create_task_redirects_with_view() {
    let (app, db) = setup().await;

    let response = send(&app, form_request("/?filter=undone&tag=urgent", "task=New+task")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?filter=undone&tag=urgent");

    let tasks = db.list_tasks(Filter::All, None).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "New task");
}

#[tokio::test]
async fn test_create_blank_task_is_ignored() {
    let (app, db) = setup().await;

    let response = send(&app, form_request("/", "task=+++")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?filter=all");
    assert_eq!(db.stats().await.unwrap().total, 0);
}

#[tokio::test]
async fn test_edit_toggle_pin_and_delete() {
    let (app, db) = setup().await;
    let id = db.create_task("draft").await.unwrap();

    let response = send(
        &app,
        form_request(&format!("/edit/{id}"), "new_task_text=final&current_filter=pinned&tag_filter="),
    )
    .await;
    assert_eq!(location(&response), "/?filter=pinned");

    send(&app, form_request(&format!("/toggle/{id}"), "")).await;
    send(&app, form_request(&format!("/pin/{id}"), "")).await;

    let task = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(task.text, "final");
    assert!(task.completed);
    assert!(task.pinned);

    let response = send(&app, form_request(&format!("/delete/{id}"), "current_filter=all&tag_filter=office")).await;
    assert_eq!(location(&response), "/?filter=all&tag=office");
    assert!(db.get_task(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_color_validation() {
    let (app, db) = setup().await;
    let id = db.create_task("colorful").await.unwrap();

    let response = send(&app, form_request(&format!("/color/{id}"), "color=%23ff0000")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(db.get_task(id).await.unwrap().unwrap().color, "#ff0000");

    let response = send(&app, form_request(&format!("/color/{id}"), "color=red")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "error");
}

#[tokio::test]
async fn test_clear_completed() {
    let (app, db) = setup().await;
    let done = db.create_task("done").await.unwrap();
    let open = db.create_task("open").await.unwrap();
    db.toggle_task_completion(done).await.unwrap();

    let response = send(&app, form_request("/clear-completed", "current_filter=done")).await;
    assert_eq!(location(&response), "/?filter=done");

    let remaining: Vec<i64> = db.list_tasks(Filter::All, None).await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![open]);
}

#[tokio::test]
async fn test_set_due_date() {
    let (app, db) = setup().await;
    let id = db.create_task("taxes").await.unwrap();

    let response = send(&app, form_request(&format!("/set-duedate/{id}"), "due_date=2030-04-15")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "success" }));
    assert!(db.get_task(id).await.unwrap().unwrap().due_date.is_some());

    let response = send(&app, form_request(&format!("/set-duedate/{id}"), "due_date=")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.get_task(id).await.unwrap().unwrap().due_date.is_none());

    let response = send(&app, form_request(&format!("/set-duedate/{id}"), "due_date=tomorrow")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_task_details() {
    let (app, db) = setup().await;
    let id = db.create_task("finish thesis").await.unwrap();
    db.add_tag(id, Tag::Office).await.unwrap();
    db.set_task_due_date(id, chrono::NaiveDate::from_ymd_opt(2000, 1, 1)).await.unwrap();

    let response = send(&app, get_request(&format!("/api/task-details/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let details = body_json(response).await;
    assert_eq!(details["text"], "finish thesis");
    assert_eq!(details["tags"], json!(["office"]));
    assert_eq!(details["due_date"], "2000-01-01");
    assert_eq!(details["warning_message"], "Did not complete the task on time");
    assert!(details["time_remaining"].is_null());
    assert!(details["created_at_display"].as_str().unwrap().contains(" at "));
}

#[tokio::test]
async fn test_task_details_missing() {
    let (app, _db) = setup().await;

    let response = send(&app, get_request("/api/task-details/404")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Task not found");
}

#[tokio::test]
async fn test_reorder_accepts_string_ids() {
    let (app, db) = setup().await;
    let a = db.create_task("a").await.unwrap();
    let b = db.create_task("b").await.unwrap();

    let body = json!({ "task_ids": [b.to_string(), a] });
    let response = send(&app, json_request(Method::POST, "/api/reorder", body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(db.get_task(b).await.unwrap().unwrap().position, 1);
    assert_eq!(db.get_task(a).await.unwrap().unwrap().position, 2);
}

#[tokio::test]
async fn test_reorder_requires_ids() {
    let (app, _db) = setup().await;

    let response = send(&app, json_request(Method::POST, "/api/reorder", json!({ "task_ids": [] }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "No task IDs provided");

    let response = send(&app, json_request(Method::POST, "/api/reorder", json!({ "task_ids": ["x"] }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_and_remove_tag() {
    let (app, db) = setup().await;
    let id = db.create_task("groceries").await.unwrap();
    let uri = format!("/api/tags/{id}");

    let response = send(&app, json_request(Method::POST, &uri, json!({ "tag_name": " Shopping " }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, json!({ "status": "added", "tag": "shopping" }));

    let response = send(&app, json_request(Method::POST, &uri, json!({ "tag_name": "shopping" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(db.get_tags_for_task(id).await.unwrap(), vec!["shopping"]);

    let response = send(&app, json_request(Method::DELETE, &uri, json!({ "tag_name": "shopping" }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "removed");

    let response = send(&app, json_request(Method::DELETE, &uri, json!({ "tag_name": "shopping" }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_tag_rejected() {
    let (app, db) = setup().await;
    let id = db.create_task("misc").await.unwrap();

    let response = send(&app, json_request(Method::POST, &format!("/api/tags/{id}"), json!({ "tag_name": "work" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Tag \"work\" is not a valid predefined tag."
    );

    let response = send(&app, json_request(Method::POST, &format!("/api/tags/{id}"), json!({ "tag_name": "" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(db.get_tags_for_task(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_list_and_stats() {
    let (app, db) = setup().await;
    let a = db.create_task("a").await.unwrap();
    let b = db.create_task("b").await.unwrap();
    db.add_tag(b, Tag::Urgent).await.unwrap();
    db.toggle_task_completion(a).await.unwrap();

    let tasks = body_json(send(&app, get_request("/api/tasks?tag=urgent")).await).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["id"], b);

    // Unknown tag filters are ignored.
    let tasks = body_json(send(&app, get_request("/api/tasks?tag=work&filter=bogus")).await).await;
    assert_eq!(tasks.as_array().unwrap().len(), 2);

    let stats = body_json(send(&app, get_request("/api/stats")).await).await;
    assert_eq!(stats, json!({ "total": 2, "completed": 1, "completion_percentage": 50 }));
}
