//! Domain model for todo records.
//!
//! # Responsibility
//! - Define the canonical todo record and its unsaved counterpart.
//! - Own title/timestamp invariants shared by every layer above.
//!
//! # Invariants
//! - Every persisted todo is identified by a store-assigned `TodoId`.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod todo;
