//! Database schema initialization for Driftlist
//!
//! Defines the SurrealDB schema for the task table and its secondary
//! indices. Table and field definitions are required; index creation is
//! best-effort and never fatal to startup.

use crate::error::DbError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::warn;

/// SQL statements for schema initialization
///
/// The `order` field is backtick-escaped in every statement to keep it
/// distinct from the `ORDER BY` keyword.
mod sql {
    /// Define the task table with all fields
    pub const DEFINE_TASK_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS task SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS owner ON task TYPE string;

        DEFINE FIELD IF NOT EXISTS text ON task TYPE string;

        DEFINE FIELD IF NOT EXISTS done ON task TYPE bool DEFAULT false;

        DEFINE FIELD IF NOT EXISTS created_at ON task TYPE datetime DEFAULT time::now();

        DEFINE FIELD IF NOT EXISTS `order` ON task TYPE option<int>;
    "#;

    /// Index for owner-scoped, creation-time-sorted reads
    pub const DEFINE_OWNER_CREATED_INDEX: &str = r#"
        DEFINE INDEX IF NOT EXISTS task_owner_created ON task FIELDS owner, created_at;
    "#;

    /// Index for owner-scoped, status-filtered reads
    pub const DEFINE_OWNER_DONE_INDEX: &str = r#"
        DEFINE INDEX IF NOT EXISTS task_owner_done ON task FIELDS owner, done;
    "#;
}

/// Initialize the database schema.
///
/// Creates the task table with all required fields, then the two
/// secondary indices. This function is idempotent - it can be called
/// multiple times safely as it uses `IF NOT EXISTS` clauses.
///
/// A failure to define the table or its fields is fatal; a failure to
/// define an index is logged and swallowed, since scoped reads stay
/// correct without it (just slower).
///
/// # Arguments
///
/// * `client` - Reference to the SurrealDB client
///
/// # Errors
///
/// Returns `DbError::Schema` if the table definition fails.
pub async fn init_schema(client: &Surreal<Db>) -> Result<(), DbError> {
    // Define the task table and fields
    client
        .query(sql::DEFINE_TASK_TABLE)
        .await
        .map_err(|e| DbError::Schema(Box::new(e)))?
        .check()
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    // Secondary indices are best-effort
    for (name, statement) in [
        ("task_owner_created", sql::DEFINE_OWNER_CREATED_INDEX),
        ("task_owner_done", sql::DEFINE_OWNER_DONE_INDEX),
    ] {
        let result = match client.query(statement).await {
            Ok(response) => response.check().map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Failed to create index {}: {}", name, e);
        }
    }

    Ok(())
}
