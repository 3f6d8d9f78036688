//! Client-side data layer for the taskboard todo service.
//!
//! # Overview
//! `TodoStore` holds the current page of todos, the category list, the
//! pagination snapshot and the active filter, and keeps them in step with a
//! remote REST API. Every mutation is followed by a full re-read of the
//! affected list; nothing is patched locally.
//!
//! # Design
//! - `ApiClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse` (host-does-IO pattern).
//! - `Transport` executes the round-trip; `UreqTransport` is the real one.
//! - `RemoteApi` composes the two into one async call per resource action.
//! - DTOs are defined independently from the mock-server crate; the
//!   end-to-end tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod notify;
pub mod remote;
pub mod store;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ParseEnumError};
pub use filter::{FilterPatch, SortField, SortOrder, TodoFilter};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier};
pub use remote::RemoteApi;
pub use store::{StoreSnapshot, TodoStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Category, CreateCategory, CreateTodo, PaginatedResponse, Pagination, Priority, Todo,
    UpdateCategory, UpdateTodo,
};
