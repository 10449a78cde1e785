//! Todo request and response DTOs.
//!
//! # Invariants
//! - A `ValidatedTitle` always holds a non-blank title.
//! - `TodoResponse` lists its fields explicitly; storage-only columns never
//!   leak through it.

use crate::model::todo::{validate_title, Todo, TodoId, TodoValidationError};
use serde::{Deserialize, Serialize};

/// Incoming create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRequest {
    pub title: String,
}

impl TodoRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Rejects blank titles before any persistence call.
    pub fn validate(self) -> Result<ValidatedTitle, TodoValidationError> {
        validate_title(&self.title)?;
        Ok(ValidatedTitle(self.title))
    }
}

/// Title that passed request validation. The text is kept as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTitle(String);

impl ValidatedTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Outgoing projection of a persisted todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl From<&Todo> for TodoResponse {
    fn from(value: &Todo) -> Self {
        Self {
            id: value.id,
            title: value.title.clone(),
            completed: value.completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Todo> for TodoResponse {
    fn from(value: Todo) -> Self {
        Self {
            id: value.id,
            title: value.title,
            completed: value.completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Projects a list of records, keeping order.
pub fn to_responses(todos: Vec<Todo>) -> Vec<TodoResponse> {
    todos.into_iter().map(TodoResponse::from).collect()
}
