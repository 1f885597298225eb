//! Task repository for owner-scoped operations on tasks
//!
//! Encapsulates the SurrealDB queries behind the mutation and query
//! surface: creation, scoped lookups and deletes, the bulk
//! clear-completed step, and the batch rank rewrite used by reorder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, trace};

use crate::error::{DbError, DbResult};
use crate::models::{Task, sort_for_display};

/// Repository for owner-scoped task operations
///
/// Every targeted read and write carries an `owner` predicate, so a
/// foreign record id behaves exactly like a missing one.
pub struct TaskRepository<'a> {
    client: &'a Surreal<Db>,
}

/// A single `(id, order)` assignment within a reorder batch
///
/// The batch is a pure assignment set: re-applying it after a partial
/// failure converges to the same final state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderChange {
    /// Task record id
    pub id: String,
    /// New owner-scoped rank
    pub order: u32,
}

/// Internal row type for deserializing from SurrealDB
#[derive(Debug, Deserialize)]
struct TaskRow {
    id: surrealdb::sql::Thing,
    owner: String,
    text: String,
    done: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    order: Option<u32>,
}

impl TaskRow {
    /// Convert a TaskRow to the shared Task model
    fn into_task(self) -> Task {
        Task {
            id: self.id.id.to_string(),
            owner: self.owner,
            text: self.text,
            done: self.done,
            created_at: self.created_at,
            order: self.order,
        }
    }
}

impl<'a> TaskRepository<'a> {
    /// Create a new TaskRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self { client }
    }

    /// Create a new task for an owner.
    ///
    /// The record id and creation timestamp are store-assigned; `done`
    /// starts false.
    ///
    /// # Arguments
    ///
    /// * `owner` - The owning identity
    /// * `text` - Already-validated task text
    /// * `order` - The rank to assign (callers use [`next_order`](Self::next_order))
    ///
    /// # Errors
    ///
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn insert(&self, owner: &str, text: &str, order: u32) -> DbResult<Task> {
        debug!("Creating task for owner {} at rank {}", owner, order);
        let mut result = self
            .client
            .query("CREATE task SET owner = $owner, text = $text, done = false, `order` = $order")
            .bind(("owner", owner.to_string()))
            .bind(("text", text.to_string()))
            .bind(("order", order))
            .await?;

        let row: Option<TaskRow> = result.take(0)?;
        let task = row
            .map(TaskRow::into_task)
            .ok_or_else(|| DbError::Unexpected {
                message: "CREATE returned no record".to_string(),
            })?;
        trace!("Created task: {:?}", task);
        Ok(task)
    }

    /// Get a task by id, scoped to an owner.
    ///
    /// Returns `None` for both a missing id and an id owned by someone
    /// else - callers cannot distinguish the two.
    pub async fn get_owned(&self, owner: &str, id: &str) -> DbResult<Option<Task>> {
        debug!("Fetching task {} for owner {}", id, owner);
        let mut result = self
            .client
            .query("SELECT * FROM type::thing('task', $id) WHERE owner = $owner")
            .bind(("id", id.to_string()))
            .bind(("owner", owner.to_string()))
            .await?;

        let row: Option<TaskRow> = result.take(0)?;
        Ok(row.map(TaskRow::into_task))
    }

    /// Set the done flag on a task.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn set_done(&self, id: &str, done: bool) -> DbResult<()> {
        debug!("Setting done = {} on task {}", done, id);
        self.client
            .query("UPDATE type::thing('task', $id) SET done = $done")
            .bind(("id", id.to_string()))
            .bind(("done", done))
            .await?;
        Ok(())
    }

    /// Delete a task by id, scoped to an owner.
    ///
    /// Returns the deleted record, or `None` when the id was missing or
    /// foreign (in which case nothing happened).
    pub async fn delete_owned(&self, owner: &str, id: &str) -> DbResult<Option<Task>> {
        debug!("Deleting task {} for owner {}", id, owner);
        let mut result = self
            .client
            .query("DELETE type::thing('task', $id) WHERE owner = $owner RETURN BEFORE")
            .bind(("id", id.to_string()))
            .bind(("owner", owner.to_string()))
            .await?;

        let row: Option<TaskRow> = result.take(0)?;
        Ok(row.map(TaskRow::into_task))
    }

    /// Delete every completed task of an owner in one bulk statement.
    ///
    /// Returns the deleted records.
    pub async fn clear_completed(&self, owner: &str) -> DbResult<Vec<Task>> {
        debug!("Clearing completed tasks for owner {}", owner);
        let mut result = self
            .client
            .query("DELETE task WHERE owner = $owner AND done = true RETURN BEFORE")
            .bind(("owner", owner.to_string()))
            .await?;

        let rows: Vec<TaskRow> = result.take(0)?;
        debug!("Cleared {} completed tasks for owner {}", rows.len(), owner);
        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    /// List every task of an owner, sorted into display order.
    ///
    /// Sorting happens in Rust with the shared comparator so records
    /// lacking a rank get a defined position (before rank 1, newest
    /// first).
    pub async fn list_owned(&self, owner: &str) -> DbResult<Vec<Task>> {
        let mut result = self
            .client
            .query("SELECT * FROM task WHERE owner = $owner")
            .bind(("owner", owner.to_string()))
            .await?;

        let rows: Vec<TaskRow> = result.take(0)?;
        let mut tasks: Vec<Task> = rows.into_iter().map(TaskRow::into_task).collect();
        sort_for_display(&mut tasks);
        Ok(tasks)
    }

    /// Compute the rank for an owner's next task.
    ///
    /// One greater than the maximum assigned rank, or 1 when the owner
    /// has no ranked tasks. Legacy records without a rank are ignored.
    pub async fn next_order(&self, owner: &str) -> DbResult<u32> {
        let mut result = self
            .client
            .query("SELECT VALUE `order` FROM task WHERE owner = $owner")
            .bind(("owner", owner.to_string()))
            .await?;

        let orders: Vec<Option<u32>> = result.take(0)?;
        Ok(orders.into_iter().flatten().max().map_or(1, |max| max + 1))
    }

    /// Apply a batch of rank assignments as one transaction.
    ///
    /// Every update keeps the owner predicate, so ids that stopped
    /// belonging to the owner between validation and write are skipped
    /// rather than hijacked. The whole batch commits atomically; a
    /// failed batch can be retried as-is.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Query` if the transaction fails.
    pub async fn write_orders(&self, owner: &str, changes: &[OrderChange]) -> DbResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        debug!(
            "Writing {} rank assignments for owner {}",
            changes.len(),
            owner
        );
        trace!("Rank assignments: {:?}", changes);

        self.client
            .query(
                r#"
                BEGIN TRANSACTION;
                FOR $change IN $changes {
                    UPDATE type::thing('task', $change.id)
                        SET `order` = $change.order
                        WHERE owner = $owner;
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("changes", changes.to_vec()))
            .bind(("owner", owner.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_db;

    #[tokio::test]
    async fn test_insert_assigns_id_and_defaults() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let task = repo.insert("ada", "write tests", 1).await.unwrap();
        assert!(!task.id.is_empty());
        assert_eq!(task.owner, "ada");
        assert_eq!(task.text, "write tests");
        assert!(!task.done);
        assert_eq!(task.order, Some(1));
    }

    #[tokio::test]
    async fn test_get_owned_scopes_by_owner() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let task = repo.insert("ada", "mine", 1).await.unwrap();

        let found = repo.get_owned("ada", &task.id).await.unwrap();
        assert!(found.is_some());

        // Foreign owner sees nothing, indistinguishable from a missing id
        let foreign = repo.get_owned("grace", &task.id).await.unwrap();
        assert!(foreign.is_none());

        let missing = repo.get_owned("ada", "no-such-id").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_set_done_round_trip() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let task = repo.insert("ada", "flip me", 1).await.unwrap();
        repo.set_done(&task.id, true).await.unwrap();

        let fetched = repo.get_owned("ada", &task.id).await.unwrap().unwrap();
        assert!(fetched.done);

        repo.set_done(&task.id, false).await.unwrap();
        let fetched = repo.get_owned("ada", &task.id).await.unwrap().unwrap();
        assert!(!fetched.done);
    }

    #[tokio::test]
    async fn test_delete_owned_returns_deleted_record() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let task = repo.insert("ada", "delete me", 1).await.unwrap();
        let deleted = repo.delete_owned("ada", &task.id).await.unwrap();
        assert_eq!(deleted.map(|t| t.id), Some(task.id.clone()));

        let gone = repo.get_owned("ada", &task.id).await.unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_delete_owned_is_noop_for_foreign_id() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let task = repo.insert("ada", "keep me", 1).await.unwrap();
        let deleted = repo.delete_owned("grace", &task.id).await.unwrap();
        assert!(deleted.is_none());

        let kept = repo.get_owned("ada", &task.id).await.unwrap();
        assert!(kept.is_some());
    }

    #[tokio::test]
    async fn test_clear_completed_only_touches_owner() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let done_a = repo.insert("ada", "done a", 1).await.unwrap();
        let open_a = repo.insert("ada", "open a", 2).await.unwrap();
        let done_g = repo.insert("grace", "done g", 1).await.unwrap();
        repo.set_done(&done_a.id, true).await.unwrap();
        repo.set_done(&done_g.id, true).await.unwrap();

        let cleared = repo.clear_completed("ada").await.unwrap();
        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared[0].id, done_a.id);

        assert!(repo.get_owned("ada", &open_a.id).await.unwrap().is_some());
        assert!(repo.get_owned("grace", &done_g.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_owned_sorted_and_scoped() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let second = repo.insert("ada", "second", 2).await.unwrap();
        let first = repo.insert("ada", "first", 1).await.unwrap();
        repo.insert("grace", "other", 1).await.unwrap();

        let tasks = repo.list_owned("ada").await.unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
        assert!(tasks.iter().all(|t| t.owner == "ada"));
    }

    #[tokio::test]
    async fn test_next_order_defaults_to_one() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);
        assert_eq!(repo.next_order("ada").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_next_order_is_max_plus_one() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        repo.insert("ada", "one", 1).await.unwrap();
        repo.insert("ada", "seven", 7).await.unwrap();
        repo.insert("grace", "other", 40).await.unwrap();

        assert_eq!(repo.next_order("ada").await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_write_orders_rewrites_ranks() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let a = repo.insert("ada", "a", 1).await.unwrap();
        let b = repo.insert("ada", "b", 2).await.unwrap();

        repo.write_orders(
            "ada",
            &[
                OrderChange {
                    id: b.id.clone(),
                    order: 1,
                },
                OrderChange {
                    id: a.id.clone(),
                    order: 2,
                },
            ],
        )
        .await
        .unwrap();

        let tasks = repo.list_owned("ada").await.unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), a.id.as_str()]);
        assert_eq!(tasks[0].order, Some(1));
        assert_eq!(tasks[1].order, Some(2));
    }

    #[tokio::test]
    async fn test_write_orders_skips_foreign_records() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let foreign = repo.insert("grace", "not yours", 5).await.unwrap();

        repo.write_orders(
            "ada",
            &[OrderChange {
                id: foreign.id.clone(),
                order: 1,
            }],
        )
        .await
        .unwrap();

        let untouched = repo.get_owned("grace", &foreign.id).await.unwrap().unwrap();
        assert_eq!(untouched.order, Some(5));
    }

    #[tokio::test]
    async fn test_write_orders_is_idempotent() {
        let db = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&db);

        let a = repo.insert("ada", "a", 1).await.unwrap();
        let changes = vec![OrderChange {
            id: a.id.clone(),
            order: 3,
        }];

        repo.write_orders("ada", &changes).await.unwrap();
        repo.write_orders("ada", &changes).await.unwrap();

        let task = repo.get_owned("ada", &a.id).await.unwrap().unwrap();
        assert_eq!(task.order, Some(3));
    }
}
