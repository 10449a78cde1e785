//! Todo use-case service.
//!
//! # Responsibility
//! - Apply existence checks, title updates and completion toggles on top of
//!   a `TodoRepository`.
//! - Convert "absent" lookups into `TodoServiceError::NotFound` at one point.
//!
//! # Invariants
//! - Holds no state between calls besides the repository and clock.
//! - Every mutation issues exactly one repository write; mutated records are
//!   always written back explicitly.
//! - Title blankness is checked by the request layer, not re-checked here;
//!   the repository still refuses invalid writes.

use crate::clock::{Clock, SystemClock};
use crate::model::todo::{NewTodo, Todo, TodoId, TodoValidationError};
use crate::repo::todo_repo::{RepoError, TodoRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Service error for todo use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Input or resulting record violates a todo invariant.
    Validation(TodoValidationError),
    /// Target todo does not exist.
    NotFound(TodoId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl TodoServiceError {
    /// Stable machine-readable code used in logs and boundary responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "todo_not_found",
            Self::Repo(_) => "storage_failed",
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Todo service facade over a repository implementation.
pub struct TodoService<R: TodoRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service stamping records with the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: TodoRepository, C: Clock> TodoService<R, C> {
    /// Creates a service with an explicit time source.
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists every todo in the repository's natural order.
    pub fn list_all(&self) -> ServiceResult<Vec<Todo>> {
        Ok(self.repo.find_all()?)
    }

    /// Creates an incomplete todo with `created_at == updated_at == now`.
    pub fn create(&self, title: impl Into<String>) -> ServiceResult<Todo> {
        let draft = NewTodo::new(title, self.clock.now_ms());
        let todo = self
            .repo
            .insert(&draft)
            .map_err(|err| log_failure("todo_create", None, err.into()))?;
        info!(
            "event=todo_create module=service status=ok id={} title_len={}",
            todo.id,
            todo.title.chars().count()
        );
        Ok(todo)
    }

    /// Replaces the title of an existing todo.
    ///
    /// `updated_at` advances even when the title is unchanged.
    pub fn update(&self, id: TodoId, title: impl Into<String>) -> ServiceResult<Todo> {
        let mut todo = self.require_todo("todo_update", id)?;
        todo.rename(title, self.clock.now_ms());
        let saved = self
            .repo
            .save(&todo)
            .map_err(|err| log_failure("todo_update", Some(id), err.into()))?;
        info!("event=todo_update module=service status=ok id={id}");
        Ok(saved)
    }

    /// Flips the completion flag of an existing todo.
    pub fn toggle(&self, id: TodoId) -> ServiceResult<Todo> {
        let mut todo = self.require_todo("todo_toggle", id)?;
        todo.toggle(self.clock.now_ms());
        let saved = self
            .repo
            .save(&todo)
            .map_err(|err| log_failure("todo_toggle", Some(id), err.into()))?;
        info!(
            "event=todo_toggle module=service status=ok id={id} completed={}",
            saved.completed
        );
        Ok(saved)
    }

    /// Deletes an existing todo.
    pub fn delete(&self, id: TodoId) -> ServiceResult<()> {
        let exists = self
            .repo
            .exists_by_id(id)
            .map_err(|err| log_failure("todo_delete", Some(id), err.into()))?;
        if !exists {
            return Err(log_failure("todo_delete", Some(id), TodoServiceError::NotFound(id)));
        }
        self.repo
            .delete_by_id(id)
            .map_err(|err| log_failure("todo_delete", Some(id), err.into()))?;
        info!("event=todo_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Gets one todo by id.
    pub fn get(&self, id: TodoId) -> ServiceResult<Todo> {
        self.require_todo("todo_get", id)
    }

    /// Incomplete todos, most recently created first.
    pub fn list_incomplete(&self) -> ServiceResult<Vec<Todo>> {
        Ok(self.repo.find_incomplete_ordered_by_created_desc()?)
    }

    /// Completed todos, most recently updated first.
    pub fn list_completed(&self) -> ServiceResult<Vec<Todo>> {
        Ok(self.repo.find_completed_ordered_by_updated_desc()?)
    }

    /// Todos with the given completion flag in natural order.
    pub fn list_by_status(&self, completed: bool) -> ServiceResult<Vec<Todo>> {
        Ok(self.repo.find_by_completed(completed)?)
    }

    /// Case-insensitive title search. The query is matched as given,
    /// surrounding whitespace included; a whitespace-only query lists everything.
    pub fn search(&self, query: &str) -> ServiceResult<Vec<Todo>> {
        if query.trim().is_empty() {
            return self.list_all();
        }
        Ok(self.repo.find_by_title_containing_ignore_case(query)?)
    }

    fn require_todo(&self, event: &'static str, id: TodoId) -> ServiceResult<Todo> {
        match self.repo.find_by_id(id) {
            Ok(Some(todo)) => Ok(todo),
            Ok(None) => Err(log_failure(event, Some(id), TodoServiceError::NotFound(id))),
            Err(err) => Err(log_failure(event, Some(id), err.into())),
        }
    }
}

fn log_failure(event: &'static str, id: Option<TodoId>, err: TodoServiceError) -> TodoServiceError {
    let id = id.map_or_else(|| "none".to_string(), |id| id.to_string());
    warn!(
        "event={event} module=service status=error id={id} error_code={} error={err}",
        err.error_code()
    );
    err
}
