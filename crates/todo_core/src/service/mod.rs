//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep boundary layers (API facade, CLI) decoupled from storage details.

pub mod todo_service;
