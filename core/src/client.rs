//! Stateless HTTP request builder and response parser for the taskboard API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each resource action is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Executing the round-trip is the job of a `Transport`; `RemoteApi` glues
//! the three together.
//!
//! Any 2xx status counts as success. Non-2xx responses become
//! `ApiError::Server`, with the server's `{"error": ...}` message extracted
//! when the body has one.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::filter::TodoFilter;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Category, CreateCategory, CreateTodo, PaginatedResponse, Todo, UpdateCategory, UpdateTodo,
};

/// Synchronous, stateless client for the taskboard API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Todos
    // -----------------------------------------------------------------------

    pub fn build_list_todos(&self, filter: &TodoFilter) -> HttpRequest {
        let query = filter.query_string();
        let path = if query.is_empty() {
            format!("{}/todos", self.base_url)
        } else {
            format!("{}/todos?{query}", self.base_url)
        };
        self.request(HttpMethod::Get, path)
    }

    pub fn build_get_todo(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/todos/{id}", self.base_url))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Post, format!("{}/todos", self.base_url), input)
    }

    pub fn build_update_todo(&self, id: u64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Put, format!("{}/todos/{id}", self.base_url), input)
    }

    pub fn build_delete_todo(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{}/todos/{id}", self.base_url))
    }

    pub fn build_toggle_complete(&self, id: u64) -> HttpRequest {
        self.request(
            HttpMethod::Patch,
            format!("{}/todos/{id}/complete", self.base_url),
        )
    }

    pub fn parse_list_todos(
        &self,
        response: HttpResponse,
    ) -> Result<PaginatedResponse<Todo>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_toggle_complete(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn build_list_categories(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/categories", self.base_url))
    }

    pub fn build_get_category(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/categories/{id}", self.base_url))
    }

    pub fn build_create_category(&self, input: &CreateCategory) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Post, format!("{}/categories", self.base_url), input)
    }

    pub fn build_update_category(
        &self,
        id: u64,
        input: &UpdateCategory,
    ) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(
            HttpMethod::Put,
            format!("{}/categories/{id}", self.base_url),
            input,
        )
    }

    pub fn build_delete_category(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{}/categories/{id}", self.base_url))
    }

    pub fn parse_list_categories(&self, response: HttpResponse) -> Result<Vec<Category>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_category(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Map non-2xx responses to `ApiError::Server`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = match serde_json::from_str::<ErrorBody>(&response.body) {
        Ok(body) => body.error,
        Err(_) => response.body.clone(),
    };
    Err(ApiError::Server {
        status: response.status,
        message,
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
