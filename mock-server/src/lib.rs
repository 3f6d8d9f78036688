use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_COLOR: &str = "#3B82F6";
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    fn rank(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub category_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub category_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Priority,
    DueDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category_id: Option<u64>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page {
    pub data: Vec<Todo>,
    pub pagination: Pagination,
}

#[derive(Default)]
pub struct Database {
    todos: BTreeMap<u64, Todo>,
    categories: BTreeMap<u64, Category>,
    last_todo_id: u64,
    last_category_id: u64,
}

impl Database {
    /// Attach the referenced category, if it still exists.
    fn resolve(&self, todo: &Todo) -> Todo {
        let mut todo = todo.clone();
        todo.category = todo
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());
        todo
    }

    fn require_category(&self, id: Option<u64>) -> Result<(), ApiFailure> {
        match id {
            Some(id) if !self.categories.contains_key(&id) => {
                Err(ApiFailure::bad_request("category not found"))
            }
            _ => Ok(()),
        }
    }
}

pub type Db = Arc<RwLock<Database>>;

/// `{"error": message}` with the given status.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub fn app() -> Router {
    router(Db::default())
}

pub fn router(db: Db) -> Router {
    let api = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/todos/{id}/complete", patch(toggle_complete))
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        );
    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("listening on {addr}");
    }
    axum::serve(listener, app()).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// --- todos ---

fn matches_query(todo: &Todo, query: &ListQuery) -> bool {
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        if !todo.title.to_lowercase().contains(&needle)
            && !todo.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if query.category_id.is_some() && todo.category_id != query.category_id {
        return false;
    }
    if query.completed.is_some_and(|c| todo.completed != c) {
        return false;
    }
    if query.priority.is_some_and(|p| todo.priority != p) {
        return false;
    }
    true
}

fn compare(a: &Todo, b: &Todo, field: SortField) -> Ordering {
    let primary = match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortField::DueDate => a.due_date.cmp(&b.due_date),
    };
    primary.then(a.id.cmp(&b.id))
}

fn validate_title(title: &str) -> Result<(), ApiFailure> {
    if title.trim().is_empty() {
        return Err(ApiFailure::bad_request("todo title is required"));
    }
    if title.chars().count() > 255 {
        return Err(ApiFailure::bad_request("todo title is too long"));
    }
    Ok(())
}

async fn list_todos(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Page> {
    let db = db.read().await;
    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT);
    let field = query.sort_by.unwrap_or(SortField::CreatedAt);
    let order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut hits: Vec<&Todo> = db.todos.values().filter(|t| matches_query(t, &query)).collect();
    hits.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = hits.len() as u64;
    let offset = (page as usize - 1) * limit as usize;
    let data = hits
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .map(|t| db.resolve(t))
        .collect();

    Json(Page {
        data,
        pagination: Pagination {
            current_page: page,
            per_page: limit,
            total,
            total_pages: total.div_ceil(limit as u64) as u32,
        },
    })
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiFailure> {
    validate_title(&input.title)?;
    let mut db = db.write().await;
    db.require_category(input.category_id)?;

    db.last_todo_id += 1;
    let now = Utc::now();
    let todo = Todo {
        id: db.last_todo_id,
        title: input.title,
        description: input.description,
        completed: false,
        priority: input.priority.unwrap_or(Priority::Medium),
        due_date: input.due_date,
        category_id: input.category_id,
        category: None,
        created_at: now,
        updated_at: now,
    };
    db.todos.insert(todo.id, todo.clone());
    log::debug!("created todo {}", todo.id);
    Ok((StatusCode::CREATED, Json(db.resolve(&todo))))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Todo>, ApiFailure> {
    let db = db.read().await;
    db.todos
        .get(&id)
        .map(|t| Json(db.resolve(t)))
        .ok_or_else(|| ApiFailure::not_found("todo not found"))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, ApiFailure> {
    let mut db = db.write().await;
    if !db.todos.contains_key(&id) {
        return Err(ApiFailure::not_found("todo not found"));
    }
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    db.require_category(input.category_id)?;

    let todo = db
        .todos
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("todo not found"))?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = description;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    if let Some(priority) = input.priority {
        todo.priority = priority;
    }
    if input.due_date.is_some() {
        todo.due_date = input.due_date;
    }
    if input.category_id.is_some() {
        todo.category_id = input.category_id;
    }
    todo.updated_at = Utc::now();
    let todo = todo.clone();
    Ok(Json(db.resolve(&todo)))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<StatusCode, ApiFailure> {
    let mut db = db.write().await;
    db.todos
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiFailure::not_found("todo not found"))
}

async fn toggle_complete(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, ApiFailure> {
    let mut db = db.write().await;
    let todo = db
        .todos
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("todo not found"))?;
    todo.completed = !todo.completed;
    todo.updated_at = Utc::now();
    let todo = todo.clone();
    Ok(Json(db.resolve(&todo)))
}

// --- categories ---

fn validate_name(name: &str) -> Result<(), ApiFailure> {
    if name.trim().is_empty() {
        return Err(ApiFailure::bad_request("category name is required"));
    }
    if name.chars().count() > 100 {
        return Err(ApiFailure::bad_request("category name is too long"));
    }
    Ok(())
}

async fn list_categories(State(db): State<Db>) -> Json<Vec<Category>> {
    let db = db.read().await;
    let mut categories: Vec<Category> = db.categories.values().cloned().collect();
    categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Json(categories)
}

async fn get_category(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Category>, ApiFailure> {
    let db = db.read().await;
    db.categories
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("category not found"))
}

async fn create_category(
    State(db): State<Db>,
    Json(input): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiFailure> {
    validate_name(&input.name)?;
    let mut db = db.write().await;
    db.last_category_id += 1;
    let now = Utc::now();
    let category = Category {
        id: db.last_category_id,
        name: input.name,
        color: input
            .color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        created_at: now,
        updated_at: now,
    };
    db.categories.insert(category.id, category.clone());
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateCategory>,
) -> Result<Json<Category>, ApiFailure> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    let mut db = db.write().await;
    let category = db
        .categories
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("category not found"))?;
    if let Some(name) = input.name {
        category.name = name;
    }
    if let Some(color) = input.color.filter(|c| !c.is_empty()) {
        category.color = color;
    }
    category.updated_at = Utc::now();
    Ok(Json(category.clone()))
}

/// Todos keep their `category_id`; only the embedded category disappears.
async fn delete_category(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let mut db = db.write().await;
    db.categories
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiFailure::not_found("category not found"))
}
