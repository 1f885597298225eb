//! Repository modules for database operations
//!
//! Provides a repository pattern implementation for owner-scoped task
//! operations, encapsulating SurrealDB queries.

mod task;

pub use task::{OrderChange, TaskRepository};
