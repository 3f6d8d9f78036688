//! Async API operations: build, execute, parse.

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::filter::TodoFilter;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    Category, CreateCategory, CreateTodo, PaginatedResponse, Todo, UpdateCategory, UpdateTodo,
};

/// One async operation per resource action.
///
/// Failures are returned as-is; nothing is retried or interpreted here.
#[derive(Debug, Clone)]
pub struct RemoteApi<T> {
    client: ApiClient,
    transport: T,
}

impl RemoteApi<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ApiClient::new(&config.base_url), UreqTransport::from_config(config))
    }
}

impl<T: Transport> RemoteApi<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn list_todos(&self, filter: &TodoFilter) -> Result<PaginatedResponse<Todo>, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos(filter)).await?;
        self.client.parse_list_todos(response)
    }

    pub async fn get_todo(&self, id: u64) -> Result<Todo, ApiError> {
        let response = self.transport.execute(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(response)
    }

    pub async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_todo(response)
    }

    pub async fn update_todo(&self, id: u64, input: &UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_todo(response)
    }

    pub async fn delete_todo(&self, id: u64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    pub async fn toggle_complete(&self, id: u64) -> Result<Todo, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_toggle_complete(id))
            .await?;
        self.client.parse_toggle_complete(response)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self.transport.execute(self.client.build_list_categories()).await?;
        self.client.parse_list_categories(response)
    }

    pub async fn get_category(&self, id: u64) -> Result<Category, ApiError> {
        let response = self.transport.execute(self.client.build_get_category(id)).await?;
        self.client.parse_get_category(response)
    }

    pub async fn create_category(&self, input: &CreateCategory) -> Result<Category, ApiError> {
        let request = self.client.build_create_category(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_category(response)
    }

    pub async fn update_category(
        &self,
        id: u64,
        input: &UpdateCategory,
    ) -> Result<Category, ApiError> {
        let request = self.client.build_update_category(id, input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_category(response)
    }

    pub async fn delete_category(&self, id: u64) -> Result<(), ApiError> {
        let response = self
            .transport
            .execute(self.client.build_delete_category(id))
            .await?;
        self.client.parse_delete_category(response)
    }
}
