//! End-to-end tests of `TodoStore` against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port in a background
//! thread, then drives the store over real HTTP through `UreqTransport`.
//! This exercises request building, query encoding and response parsing
//! against the actual server and catches schema drift between the crates.

use std::time::Duration;

use taskboard_core::{
    ApiError, ClientConfig, CreateCategory, CreateTodo, FilterPatch, Priority, RemoteApi,
    TodoFilter, TodoStore, UpdateCategory, UpdateTodo, UreqTransport,
};

/// Start a mock server on a random port and return its API base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

fn store_for(base_url: &str) -> TodoStore<UreqTransport> {
    let config = ClientConfig::new(base_url).with_timeout(Duration::from_secs(10));
    TodoStore::new(RemoteApi::from_config(&config))
}

fn titled(title: &str, priority: Priority) -> CreateTodo {
    CreateTodo {
        priority: Some(priority),
        ..CreateTodo::new(title)
    }
}

#[tokio::test]
async fn crud_lifecycle() {
    let store = store_for(&start_server());

    // Step 1: nothing there yet.
    store.fetch_todos(None).await;
    assert!(store.todos().is_empty());
    assert_eq!(store.pagination().total, 0);

    // Step 2: create, and the refresh shows it.
    let created = store.create_todo(&CreateTodo::new("Integration test")).await.unwrap();
    assert_eq!(created.priority, Priority::Medium);
    assert_eq!(store.todos(), vec![created.clone()]);

    // Step 3: get.
    let fetched = store.api().get_todo(created.id).await.unwrap();
    assert_eq!(fetched, created);

    // Step 4: partial update.
    let update = UpdateTodo {
        title: Some("Updated title".to_string()),
        ..Default::default()
    };
    let updated = store.update_todo(created.id, &update).await.unwrap();
    assert_eq!(updated.title, "Updated title");
    assert_eq!(store.todos()[0].title, "Updated title");

    // Step 5: delete.
    store.delete_todo(created.id).await.unwrap();
    assert!(store.todos().is_empty());

    // Step 6: get after delete.
    let err = store.api().get_todo(created.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn high_priority_filter_reports_server_totals() {
    let store = store_for(&start_server());
    store.create_todo(&titled("Ship release", Priority::High)).await.unwrap();
    store.create_todo(&titled("Fix outage", Priority::High)).await.unwrap();
    store.create_todo(&titled("Water plants", Priority::Low)).await.unwrap();

    let filter = TodoFilter {
        priority: Some(Priority::High),
        page: Some(1),
        limit: Some(10),
        ..Default::default()
    };
    store.fetch_todos(Some(filter)).await;

    assert_eq!(store.pagination().total, 2);
    assert_eq!(store.todos().len(), 2);
    assert!(store.todos().iter().all(|t| t.priority == Priority::High));
}

#[tokio::test]
async fn create_leaves_no_drift_from_an_independent_fetch() {
    let store = store_for(&start_server());
    store.create_todo(&titled("Low one", Priority::Low)).await.unwrap();
    store.set_filter(&FilterPatch::new().priority(Some(Priority::High)).limit(Some(2)));

    store.create_todo(&titled("High one", Priority::High)).await.unwrap();
    store.create_todo(&titled("High two", Priority::High)).await.unwrap();
    store.create_todo(&titled("High three", Priority::High)).await.unwrap();

    let independent = store.api().list_todos(&store.filter()).await.unwrap();
    assert_eq!(store.todos(), independent.data);
    assert_eq!(store.pagination(), independent.pagination);
    assert_eq!(store.pagination().total_pages, 2);
}

#[tokio::test]
async fn toggle_complete_flips_after_refresh() {
    let store = store_for(&start_server());
    let todo = store.create_todo(&CreateTodo::new("Flip me")).await.unwrap();
    assert!(!todo.completed);

    store.toggle_complete(todo.id).await.unwrap();
    assert!(store.todos()[0].completed);

    store.toggle_complete(todo.id).await.unwrap();
    assert!(!store.todos()[0].completed);
}

#[tokio::test]
async fn created_category_appears_after_fetch() {
    let store = store_for(&start_server());

    store
        .create_category(&CreateCategory::new("Work").with_color("#3B82F6"))
        .await
        .unwrap();
    store.fetch_categories().await;

    let categories = store.categories();
    assert!(categories
        .iter()
        .any(|c| c.name == "Work" && c.color == "#3B82F6"));
}

#[tokio::test]
async fn category_update_and_delete_lifecycle() {
    let store = store_for(&start_server());
    let work = store.create_category(&CreateCategory::new("Work")).await.unwrap();

    // Step 1: deleting a missing category fails and changes nothing.
    let before = store.snapshot();
    let err = store.delete_category(work.id + 100).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.snapshot(), before);

    // Step 2: rename, and the refreshed list shows it.
    let rename = UpdateCategory {
        name: Some("Job".to_string()),
        ..Default::default()
    };
    let renamed = store.update_category(work.id, &rename).await.unwrap();
    assert_eq!(renamed.name, "Job");
    let listed: Vec<_> = store
        .categories()
        .into_iter()
        .map(|c| (c.name, c.color))
        .collect();
    assert_eq!(listed, [("Job".to_string(), "#3B82F6".to_string())]);

    // Step 3: delete empties the list.
    store.delete_category(work.id).await.unwrap();
    assert!(store.categories().is_empty());
}

#[tokio::test]
async fn category_filter_and_embedding() {
    let store = store_for(&start_server());
    let home = store.create_category(&CreateCategory::new("Home")).await.unwrap();
    let input = CreateTodo {
        category_id: Some(home.id),
        ..CreateTodo::new("Fix sink")
    };
    store.create_todo(&input).await.unwrap();
    store.create_todo(&CreateTodo::new("Unfiled")).await.unwrap();

    store
        .apply_filter(&FilterPatch::new().category_id(Some(home.id)))
        .await;

    let todos = store.todos();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].category.as_ref().map(|c| c.name.as_str()), Some("Home"));
}

#[tokio::test]
async fn search_text_survives_query_encoding() {
    let store = store_for(&start_server());
    store.create_todo(&CreateTodo::new("Buy milk & eggs")).await.unwrap();
    store.create_todo(&CreateTodo::new("Buy bread")).await.unwrap();

    store
        .apply_filter(&FilterPatch::new().search(Some("milk & EGGS".to_string())))
        .await;

    assert_eq!(store.todos().len(), 1);
    assert_eq!(store.todos()[0].title, "Buy milk & eggs");
}

#[tokio::test]
async fn deleting_missing_todo_leaves_list_unchanged() {
    let store = store_for(&start_server());
    store.create_todo(&CreateTodo::new("Keep me")).await.unwrap();
    let before = store.snapshot();

    let err = store.delete_todo(9_999).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 404, .. }));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn failed_update_leaves_state_identical() {
    let store = store_for(&start_server());
    store.create_category(&CreateCategory::new("Work")).await.unwrap();
    store.create_todo(&CreateTodo::new("Stable")).await.unwrap();
    let before = store.snapshot();

    let bad_category = UpdateTodo {
        category_id: Some(404),
        ..Default::default()
    };
    let id = before.todos[0].id;
    let err = store.update_todo(id, &bad_category).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 400, .. }));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let store = store_for(&format!("http://{addr}/api"));

    store.fetch_todos(None).await;
    assert!(store.todos().is_empty());
    assert!(!store.is_loading());

    let err = store.create_todo(&CreateTodo::new("Lost")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
