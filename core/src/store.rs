//! Todo/category state container.
//!
//! # Design
//! `TodoStore` is an explicitly constructed value; share it with `Arc` when
//! several tasks need it. It holds the current page of todos, the category
//! list, the pagination snapshot, the active filter and a loading flag.
//!
//! - Reads (`fetch_todos`, `fetch_categories`) report failures through the
//!   `Notifier` and leave prior state untouched. They never return errors.
//! - Mutations call the API, then re-read the affected list in full. Nothing
//!   is patched locally, so a failed mutation cannot leave partial state.
//!   Failures are reported and also returned so the caller can keep its
//!   form open.
//! - Overlapping fetches are sequenced: each fetch takes a number when it
//!   starts and its response is applied only if no later-issued fetch has
//!   been applied already.
//! - State lives behind a `Mutex` that is never held across an await.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ApiError;
use crate::filter::{FilterPatch, TodoFilter, DEFAULT_PAGE};
use crate::notify::{LogNotifier, Notice, Notifier};
use crate::remote::RemoteApi;
use crate::transport::Transport;
use crate::types::{
    Category, CreateCategory, CreateTodo, PaginatedResponse, Pagination, Todo, UpdateCategory,
    UpdateTodo,
};

/// A point-in-time copy of everything the store exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub todos: Vec<Todo>,
    pub categories: Vec<Category>,
    pub pagination: Pagination,
    pub filter: TodoFilter,
    pub loading: bool,
}

#[derive(Debug)]
struct StoreState {
    todos: Vec<Todo>,
    categories: Vec<Category>,
    pagination: Pagination,
    filter: TodoFilter,
    /// Sequence number of the todo fetch whose response is on display.
    todos_applied: u64,
    categories_applied: u64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            categories: Vec::new(),
            pagination: Pagination::default(),
            filter: TodoFilter::initial(),
            todos_applied: 0,
            categories_applied: 0,
        }
    }
}

/// Counts one in-flight todo fetch for as long as it lives.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct TodoStore<T> {
    api: RemoteApi<T>,
    notifier: Box<dyn Notifier>,
    state: Mutex<StoreState>,
    in_flight: AtomicUsize,
    todos_issued: AtomicU64,
    categories_issued: AtomicU64,
}

impl<T: Transport> TodoStore<T> {
    /// Store that reports notices through [`LogNotifier`].
    pub fn new(api: RemoteApi<T>) -> Self {
        Self::with_notifier(api, LogNotifier)
    }

    pub fn with_notifier(api: RemoteApi<T>, notifier: impl Notifier + 'static) -> Self {
        Self {
            api,
            notifier: Box::new(notifier),
            state: Mutex::new(StoreState::default()),
            in_flight: AtomicUsize::new(0),
            todos_issued: AtomicU64::new(0),
            categories_issued: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &RemoteApi<T> {
        &self.api
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.lock().pagination
    }

    pub fn filter(&self) -> TodoFilter {
        self.lock().filter.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.lock();
        StoreSnapshot {
            todos: state.todos.clone(),
            categories: state.categories.clone(),
            pagination: state.pagination,
            filter: state.filter.clone(),
            loading: self.is_loading(),
        }
    }

    // -----------------------------------------------------------------------
    // Filter
    // -----------------------------------------------------------------------

    /// Merge `patch` into the current filter. Does not fetch.
    pub fn set_filter(&self, patch: &FilterPatch) {
        self.lock().filter.apply(patch);
    }

    /// Merge `patch`, go back to the first page unless the patch picks a
    /// page itself, then fetch with the resulting filter.
    pub async fn apply_filter(&self, patch: &FilterPatch) {
        let filter = {
            let mut state = self.lock();
            state.filter.apply(patch);
            if patch.page.is_none() {
                state.filter.page = Some(DEFAULT_PAGE);
            }
            state.filter.clone()
        };
        self.fetch_todos(Some(filter)).await;
    }

    // -----------------------------------------------------------------------
    // Todos
    // -----------------------------------------------------------------------

    /// Load the todo page for `filter`, or for the current filter when
    /// `None`. `filter` is used for this request only and is not stored.
    pub async fn fetch_todos(&self, filter: Option<TodoFilter>) {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let filter = filter.unwrap_or_else(|| self.filter());
        let seq = self.todos_issued.fetch_add(1, Ordering::SeqCst) + 1;

        match self.api.list_todos(&filter).await {
            Ok(page) => self.apply_todos(seq, page),
            Err(err) => self.report("Failed to fetch todos", &err),
        }
    }

    pub async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let todo = self
            .api
            .create_todo(input)
            .await
            .map_err(|err| self.fail("Failed to create todo", err))?;
        self.notifier.notify(Notice::success("Todo created successfully"));
        self.fetch_todos(None).await;
        Ok(todo)
    }

    pub async fn update_todo(&self, id: u64, input: &UpdateTodo) -> Result<Todo, ApiError> {
        let todo = self
            .api
            .update_todo(id, input)
            .await
            .map_err(|err| self.fail("Failed to update todo", err))?;
        self.notifier.notify(Notice::success("Todo updated successfully"));
        self.fetch_todos(None).await;
        Ok(todo)
    }

    pub async fn delete_todo(&self, id: u64) -> Result<(), ApiError> {
        self.api
            .delete_todo(id)
            .await
            .map_err(|err| self.fail("Failed to delete todo", err))?;
        self.notifier.notify(Notice::success("Todo deleted successfully"));
        self.fetch_todos(None).await;
        Ok(())
    }

    pub async fn toggle_complete(&self, id: u64) -> Result<Todo, ApiError> {
        let todo = self
            .api
            .toggle_complete(id)
            .await
            .map_err(|err| self.fail("Failed to toggle todo status", err))?;
        self.fetch_todos(None).await;
        Ok(todo)
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub async fn fetch_categories(&self) {
        let seq = self.categories_issued.fetch_add(1, Ordering::SeqCst) + 1;
        match self.api.list_categories().await {
            Ok(categories) => self.apply_categories(seq, categories),
            Err(err) => self.report("Failed to fetch categories", &err),
        }
    }

    pub async fn create_category(&self, input: &CreateCategory) -> Result<Category, ApiError> {
        let category = self
            .api
            .create_category(input)
            .await
            .map_err(|err| self.fail("Failed to create category", err))?;
        self.notifier.notify(Notice::success("Category created successfully"));
        self.fetch_categories().await;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: u64,
        input: &UpdateCategory,
    ) -> Result<Category, ApiError> {
        let category = self
            .api
            .update_category(id, input)
            .await
            .map_err(|err| self.fail("Failed to update category", err))?;
        self.notifier.notify(Notice::success("Category updated successfully"));
        self.fetch_categories().await;
        Ok(category)
    }

    pub async fn delete_category(&self, id: u64) -> Result<(), ApiError> {
        self.api
            .delete_category(id)
            .await
            .map_err(|err| self.fail("Failed to delete category", err))?;
        self.notifier.notify(Notice::success("Category deleted successfully"));
        self.fetch_categories().await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_todos(&self, seq: u64, page: PaginatedResponse<Todo>) {
        let mut state = self.lock();
        if seq <= state.todos_applied {
            log::debug!(
                "dropping stale todo page from fetch #{seq} (#{} already applied)",
                state.todos_applied
            );
            return;
        }
        log::debug!(
            "applying todo page {} of {} from fetch #{seq}",
            page.pagination.current_page,
            page.pagination.total_pages
        );
        state.todos = page.data;
        state.pagination = page.pagination;
        state.todos_applied = seq;
    }

    fn apply_categories(&self, seq: u64, categories: Vec<Category>) {
        let mut state = self.lock();
        if seq <= state.categories_applied {
            log::debug!("dropping stale category list from fetch #{seq}");
            return;
        }
        state.categories = categories;
        state.categories_applied = seq;
    }

    fn report(&self, message: &str, err: &ApiError) {
        log::error!("{message}: {err}");
        self.notifier.notify(Notice::error(message));
    }

    fn fail(&self, message: &str, err: ApiError) -> ApiError {
        self.report(message, &err);
        err
    }
}
