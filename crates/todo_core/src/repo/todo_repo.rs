//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and ordered list queries over the `todos` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before any SQL mutation.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Ordered queries break timestamp ties by `id DESC`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::todo::{NewTodo, Todo, TodoId, TodoValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_COLUMNS: &str = "id, title, completed, created_at, updated_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract consumed by `TodoService`.
///
/// Each method is a single store round-trip. No atomicity is promised across
/// separate calls.
pub trait TodoRepository {
    /// Inserts a draft and returns it with the store-assigned id.
    fn insert(&self, todo: &NewTodo) -> RepoResult<Todo>;
    /// Full upsert of a persisted record. `created_at` of an existing row is
    /// kept as stored.
    fn save(&self, todo: &Todo) -> RepoResult<Todo>;
    fn find_by_id(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    fn exists_by_id(&self, id: TodoId) -> RepoResult<bool>;
    /// Removes the row. Deleting a missing id is a no-op.
    fn delete_by_id(&self, id: TodoId) -> RepoResult<()>;
    /// All rows in store order (ascending id).
    fn find_all(&self) -> RepoResult<Vec<Todo>>;
    fn find_incomplete_ordered_by_created_desc(&self) -> RepoResult<Vec<Todo>>;
    fn find_completed_ordered_by_updated_desc(&self) -> RepoResult<Vec<Todo>>;
    /// Rows with the given completion flag in store order.
    fn find_by_completed(&self, completed: bool) -> RepoResult<Vec<Todo>>;
    /// Case-insensitive literal substring match on `title`, in store order.
    fn find_by_title_containing_ignore_case(&self, needle: &str) -> RepoResult<Vec<Todo>>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when `todos` is absent despite the version.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'todos'
            );",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(RepoError::MissingRequiredTable("todos"));
        }

        Ok(Self { conn })
    }

    fn query_list(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }

    fn query_one(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Todo> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        if let Some(row) = rows.next()? {
            return parse_todo_row(row);
        }
        Err(RepoError::InvalidData(
            "write statement returned no row".to_string(),
        ))
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn insert(&self, todo: &NewTodo) -> RepoResult<Todo> {
        todo.validate()?;

        self.query_one(
            &format!(
                "INSERT INTO todos (title, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {TODO_COLUMNS};"
            ),
            params![
                todo.title.as_str(),
                todo.completed,
                todo.created_at,
                todo.updated_at,
            ],
        )
    }

    fn save(&self, todo: &Todo) -> RepoResult<Todo> {
        todo.validate()?;

        self.query_one(
            &format!(
                "INSERT INTO todos (id, title, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    completed = excluded.completed,
                    updated_at = excluded.updated_at
                 RETURNING {TODO_COLUMNS};"
            ),
            params![
                todo.id.get(),
                todo.title.as_str(),
                todo.completed,
                todo.created_at,
                todo.updated_at,
            ],
        )
    }

    fn find_by_id(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }
        Ok(None)
    }

    fn exists_by_id(&self, id: TodoId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM todos WHERE id = ?1;", [id.get()], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn delete_by_id(&self, id: TodoId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM todos WHERE id = ?1;", [id.get()])?;
        Ok(())
    }

    fn find_all(&self) -> RepoResult<Vec<Todo>> {
        self.query_list(
            &format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id ASC;"),
            [],
        )
    }

    fn find_incomplete_ordered_by_created_desc(&self) -> RepoResult<Vec<Todo>> {
        self.query_list(
            &format!(
                "SELECT {TODO_COLUMNS} FROM todos
                 WHERE completed = 0
                 ORDER BY created_at DESC, id DESC;"
            ),
            [],
        )
    }

    fn find_completed_ordered_by_updated_desc(&self) -> RepoResult<Vec<Todo>> {
        self.query_list(
            &format!(
                "SELECT {TODO_COLUMNS} FROM todos
                 WHERE completed = 1
                 ORDER BY updated_at DESC, id DESC;"
            ),
            [],
        )
    }

    fn find_by_completed(&self, completed: bool) -> RepoResult<Vec<Todo>> {
        self.query_list(
            &format!("SELECT {TODO_COLUMNS} FROM todos WHERE completed = ?1 ORDER BY id ASC;"),
            [completed],
        )
    }

    fn find_by_title_containing_ignore_case(&self, needle: &str) -> RepoResult<Vec<Todo>> {
        // SQLite's LIKE/lower() only fold ASCII, so matching happens here.
        let needle = needle.to_lowercase();
        let todos = self.find_all()?;
        Ok(todos
            .into_iter()
            .filter(|todo| todo.title.to_lowercase().contains(&needle))
            .collect())
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed"
            )));
        }
    };

    let todo = Todo {
        id: TodoId(row.get("id")?),
        title: row.get("title")?,
        completed,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    todo.validate().map_err(|err| {
        RepoError::InvalidData(format!("todo {} failed validation: {err}", todo.id))
    })?;
    Ok(todo)
}
