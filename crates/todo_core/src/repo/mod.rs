//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract the todo service depends on.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Todo::validate()` before persistence.
//! - Absence is reported as `Option`/`bool`; turning it into a not-found
//!   failure is the service's job.

pub mod todo_repo;
