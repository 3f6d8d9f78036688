use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, Category, Page, Todo};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Send one request through a long-lived router so state carries over.
async fn send(app: &mut Router, request: Request<String>) -> axum::response::Response {
    ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap()
}

async fn create(app: &mut Router, body: &str) -> Todo {
    let resp = send(app, json_request("POST", "/api/todos", body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- health ---

#[tokio::test]
async fn health_is_outside_the_api_prefix() {
    let resp = app().oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/api/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Page = body_json(resp).await;
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.current_page, 1);
    assert_eq!(page.pagination.per_page, 10);
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.total_pages, 0);
}

#[tokio::test]
async fn list_todos_rejects_unknown_sort_field() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/todos?sort_by=password"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_todos_filters_and_paginates() {
    let mut app = app();
    for i in 0..5 {
        create(&mut app, &format!(r#"{{"title":"high {i}","priority":"high"}}"#)).await;
    }
    create(&mut app, r#"{"title":"low one","priority":"low"}"#).await;

    let resp = send(
        &mut app,
        empty_request("GET", "/api/todos?priority=high&page=2&limit=2&sort_by=title&sort_order=ASC"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Page = body_json(resp).await;
    let titles: Vec<_> = page.data.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["high 2", "high 3"]);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.current_page, 2);
}

#[tokio::test]
async fn list_todos_caps_limit() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/todos?limit=1000"))
        .await
        .unwrap();
    let page: Page = body_json(resp).await;
    assert_eq!(page.pagination.per_page, 100);
}

#[tokio::test]
async fn list_todos_defaults_to_newest_first() {
    let mut app = app();
    create(&mut app, r#"{"title":"first"}"#).await;
    create(&mut app, r#"{"title":"second"}"#).await;

    let resp = send(&mut app, empty_request("GET", "/api/todos")).await;
    let page: Page = body_json(resp).await;
    assert_eq!(page.data[0].title, "second");
    assert_eq!(page.data[1].title, "first");
}

#[tokio::test]
async fn priority_sort_follows_urgency_not_spelling() {
    let mut app = app();
    create(&mut app, r#"{"title":"m","priority":"medium"}"#).await;
    create(&mut app, r#"{"title":"h","priority":"high"}"#).await;
    create(&mut app, r#"{"title":"l","priority":"low"}"#).await;

    let resp = send(
        &mut app,
        empty_request("GET", "/api/todos?sort_by=priority&sort_order=DESC"),
    )
    .await;
    let page: Page = body_json(resp).await;
    let titles: Vec<_> = page.data.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["h", "m", "l"]);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_defaults() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);
    assert_eq!(todo.title, "Buy milk");
    assert_eq!(todo.description, "");
    assert!(!todo.completed);
    assert_eq!(todo.priority, mock_server::Priority::Medium);
}

#[tokio::test]
async fn create_todo_blank_title_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "todo title is required");
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_todo_with_unknown_category_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"x","category_id":9}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let resp = app().oneshot(empty_request("GET", "/api/todos/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "todo not found");
}

#[tokio::test]
async fn get_todo_bad_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/todos/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update / toggle / delete ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/todos/42", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggle_complete_flips_both_ways() {
    let mut app = app();
    let todo = create(&mut app, r#"{"title":"Flip"}"#).await;
    let uri = format!("/api/todos/{}/complete", todo.id);

    let resp = send(&mut app, empty_request("PATCH", &uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let toggled: Todo = body_json(resp).await;
    assert!(toggled.completed);

    let resp = send(&mut app, empty_request("PATCH", &uri)).await;
    let toggled: Todo = body_json(resp).await;
    assert!(!toggled.completed);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/api/todos/42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- categories ---

#[tokio::test]
async fn category_lifecycle_and_embedding() {
    let mut app = app();

    let resp = send(&mut app, json_request("POST", "/api/categories", r#"{"name":"Work"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let work: Category = body_json(resp).await;
    assert_eq!(work.color, "#3B82F6");

    let body = format!(r#"{{"title":"Report","category_id":{}}}"#, work.id);
    let todo = create(&mut app, &body).await;
    assert_eq!(todo.category.as_ref().map(|c| c.name.as_str()), Some("Work"));

    let resp = send(
        &mut app,
        json_request("PUT", &format!("/api/categories/{}", work.id), r##"{"color":"#EF4444"}"##),
    )
    .await;
    let updated: Category = body_json(resp).await;
    assert_eq!(updated.name, "Work");
    assert_eq!(updated.color, "#EF4444");

    let resp = send(&mut app, empty_request("DELETE", &format!("/api/categories/{}", work.id))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // the todo keeps its reference but loses the embedded category
    let resp = send(&mut app, empty_request("GET", &format!("/api/todos/{}", todo.id))).await;
    let orphan: Todo = body_json(resp).await;
    assert_eq!(orphan.category_id, Some(work.id));
    assert!(orphan.category.is_none());
}

#[tokio::test]
async fn categories_are_listed_by_name() {
    let mut app = app();
    for name in ["Personal", "Errands", "Work"] {
        let body = format!(r#"{{"name":"{name}"}}"#);
        send(&mut app, json_request("POST", "/api/categories", &body)).await;
    }

    let resp = send(&mut app, empty_request("GET", "/api/categories")).await;
    let categories: Vec<Category> = body_json(resp).await;
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Errands", "Personal", "Work"]);
}

#[tokio::test]
async fn create_category_without_name_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/categories", r#"{"name":""}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = app();

    let created = create(&mut app, r#"{"title":"Walk dog","description":"around the park"}"#).await;
    let id = created.id;

    // list: should contain the one todo
    let resp = send(&mut app, empty_request("GET", "/api/todos")).await;
    let page: Page = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, id);

    // update: partial: only completed
    let resp = send(
        &mut app,
        json_request("PUT", &format!("/api/todos/{id}"), r#"{"completed":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.completed);

    // update: partial: only title
    let resp = send(
        &mut app,
        json_request("PUT", &format!("/api/todos/{id}"), r#"{"title":"Walk cat"}"#),
    )
    .await;
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert_eq!(updated.description, "around the park");
    assert!(updated.completed);

    // delete
    let resp = send(&mut app, empty_request("DELETE", &format!("/api/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = send(&mut app, empty_request("GET", &format!("/api/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    let resp = send(&mut app, empty_request("GET", "/api/todos")).await;
    let page: Page = body_json(resp).await;
    assert!(page.data.is_empty());
}
