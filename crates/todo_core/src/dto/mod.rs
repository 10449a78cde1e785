//! Request/response shapes exchanged with boundary layers.
//!
//! # Responsibility
//! - Turn external input into validated commands before the service runs.
//! - Project persisted records into explicit, allow-listed response shapes.

pub mod todo_dto;
