//! Boundary facade for transport adapters (CLI today, HTTP later).
//!
//! # Responsibility
//! - Accept request DTOs and return response projections.
//! - Map service failures to a transport-neutral status and a stable code.
//!
//! # Invariants
//! - Blank titles are rejected here, before the service or the store runs.
//! - Every failure maps to exactly one `TransportStatus`.

use crate::clock::{Clock, SystemClock};
use crate::dto::todo_dto::{to_responses, TodoRequest, TodoResponse};
use crate::model::todo::{TodoId, TodoValidationError};
use crate::repo::todo_repo::TodoRepository;
use crate::service::todo_service::{TodoService, TodoServiceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Transport-neutral outcome class, mirroring HTTP semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    Ok,
    BadRequest,
    NotFound,
    InternalError,
}

impl TransportStatus {
    /// Equivalent HTTP status code.
    pub fn http_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }
}

/// Failure returned to transport adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation(TodoValidationError),
    NotFound(TodoId),
    /// Storage failure, flattened to a message for the caller.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> TransportStatus {
        match self {
            Self::Validation(_) => TransportStatus::BadRequest,
            Self::NotFound(_) => TransportStatus::NotFound,
            Self::Internal(_) => TransportStatus::InternalError,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "todo_not_found",
            Self::Internal(_) => "storage_failed",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<TodoServiceError> for ApiError {
    fn from(value: TodoServiceError) -> Self {
        match value {
            TodoServiceError::Validation(err) => Self::Validation(err),
            TodoServiceError::NotFound(id) => Self::NotFound(id),
            TodoServiceError::Repo(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TodoValidationError> for ApiError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Use-case API over `TodoService`, speaking DTOs only.
pub struct TodoApi<R: TodoRepository, C: Clock = SystemClock> {
    service: TodoService<R, C>,
}

impl<R: TodoRepository, C: Clock> TodoApi<R, C> {
    pub fn new(service: TodoService<R, C>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &TodoService<R, C> {
        &self.service
    }

    pub fn list_all(&self) -> ApiResult<Vec<TodoResponse>> {
        Ok(to_responses(self.service.list_all()?))
    }

    pub fn create(&self, request: TodoRequest) -> ApiResult<TodoResponse> {
        let title = request.validate()?;
        Ok(self.service.create(title.into_inner())?.into())
    }

    pub fn update(&self, id: TodoId, request: TodoRequest) -> ApiResult<TodoResponse> {
        let title = request.validate()?;
        Ok(self.service.update(id, title.into_inner())?.into())
    }

    pub fn toggle(&self, id: TodoId) -> ApiResult<TodoResponse> {
        Ok(self.service.toggle(id)?.into())
    }

    pub fn delete(&self, id: TodoId) -> ApiResult<()> {
        Ok(self.service.delete(id)?)
    }

    pub fn get(&self, id: TodoId) -> ApiResult<TodoResponse> {
        Ok(self.service.get(id)?.into())
    }

    pub fn list_incomplete(&self) -> ApiResult<Vec<TodoResponse>> {
        Ok(to_responses(self.service.list_incomplete()?))
    }

    pub fn list_completed(&self) -> ApiResult<Vec<TodoResponse>> {
        Ok(to_responses(self.service.list_completed()?))
    }

    pub fn list_by_status(&self, completed: bool) -> ApiResult<Vec<TodoResponse>> {
        Ok(to_responses(self.service.list_by_status(completed)?))
    }

    pub fn search(&self, query: &str) -> ApiResult<Vec<TodoResponse>> {
        Ok(to_responses(self.service.search(query)?))
    }
}
