//! Core domain logic for the todo record manager.
//! This crate is the single source of truth for todo invariants.

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod dto;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use api::{ApiError, ApiResult, TodoApi, TransportStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DbLocation, TodoConfig};
pub use dto::todo_dto::{TodoRequest, TodoResponse, ValidatedTitle};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::todo::{NewTodo, Todo, TodoId, TodoValidationError};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use service::todo_service::{ServiceResult, TodoService, TodoServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
