//! Todo domain model.
//!
//! # Responsibility
//! - Define the persisted `Todo` record and the unsaved `NewTodo` draft.
//! - Provide mutation helpers that keep `updated_at` moving forward.
//!
//! # Invariants
//! - `id` is assigned by the repository on insert and never changes.
//! - `title` is never blank after a successful write.
//! - `updated_at >= created_at` at all times.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of a persisted todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl TodoId {
    /// Returns the raw integer key.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TodoId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Validation failures for todo write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Title is empty or whitespace only.
    BlankTitle,
    /// `updated_at` would precede `created_at`.
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for TodoValidationError {}

/// Checks that a title carries at least one non-whitespace character.
pub fn validate_title(title: &str) -> Result<(), TodoValidationError> {
    if title.trim().is_empty() {
        return Err(TodoValidationError::BlankTitle);
    }
    Ok(())
}

fn validate_timestamps(created_at: i64, updated_at: i64) -> Result<(), TodoValidationError> {
    if updated_at < created_at {
        return Err(TodoValidationError::UpdatedBeforeCreated {
            created_at,
            updated_at,
        });
    }
    Ok(())
}

/// Unsaved todo draft. The repository assigns `id` on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Equal to `created_at` for fresh drafts.
    pub updated_at: i64,
}

impl NewTodo {
    /// Creates an incomplete draft stamped with `now_ms` for both timestamps.
    pub fn new(title: impl Into<String>, now_ms: i64) -> Self {
        Self {
            title: title.into(),
            completed: false,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Validates draft invariants before persistence.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)?;
        validate_timestamps(self.created_at, self.updated_at)
    }

    /// Attaches a store-assigned id, producing the persisted shape.
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    /// Unix epoch milliseconds. Immutable after insert.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed by every mutation.
    pub updated_at: i64,
}

impl Todo {
    /// Validates record invariants.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)?;
        validate_timestamps(self.created_at, self.updated_at)
    }

    /// Replaces the title and refreshes `updated_at`.
    pub fn rename(&mut self, title: impl Into<String>, now_ms: i64) {
        self.title = title.into();
        self.touch(now_ms);
    }

    /// Flips `completed` and refreshes `updated_at`.
    pub fn toggle(&mut self, now_ms: i64) {
        self.completed = !self.completed;
        self.touch(now_ms);
    }

    /// Refreshes `updated_at`, always advancing it by at least one
    /// millisecond even if the clock stalls or steps backwards.
    pub fn touch(&mut self, now_ms: i64) {
        self.updated_at = now_ms.max(self.updated_at.saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_title, NewTodo, Todo, TodoId, TodoValidationError};

    fn persisted(title: &str, at: i64) -> Todo {
        NewTodo::new(title, at).into_todo(TodoId(1))
    }

    #[test]
    fn new_draft_is_incomplete_with_equal_timestamps() {
        let draft = NewTodo::new("write tests", 1_000);
        assert!(!draft.completed);
        assert_eq!(draft.created_at, draft.updated_at);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn blank_titles_are_rejected() {
        assert_eq!(validate_title(""), Err(TodoValidationError::BlankTitle));
        assert_eq!(validate_title(" \t\n"), Err(TodoValidationError::BlankTitle));
        assert!(validate_title(" x ").is_ok());
    }

    #[test]
    fn touch_advances_even_when_clock_stalls() {
        let mut todo = persisted("a", 5_000);
        todo.touch(5_000);
        assert_eq!(todo.updated_at, 5_001);
        todo.touch(4_000);
        assert_eq!(todo.updated_at, 5_002);
        todo.touch(9_000);
        assert_eq!(todo.updated_at, 9_000);
        assert_eq!(todo.created_at, 5_000);
    }

    #[test]
    fn toggle_flips_only_completed() {
        let mut todo = persisted("a", 10);
        todo.toggle(20);
        assert!(todo.completed);
        assert_eq!(todo.title, "a");
        todo.toggle(30);
        assert!(!todo.completed);
        assert_eq!(todo.updated_at, 30);
    }

    #[test]
    fn validate_rejects_reversed_timestamps() {
        let mut todo = persisted("a", 100);
        todo.updated_at = 99;
        assert_eq!(
            todo.validate(),
            Err(TodoValidationError::UpdatedBeforeCreated {
                created_at: 100,
                updated_at: 99,
            })
        );
    }
}
