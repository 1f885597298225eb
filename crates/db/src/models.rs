//! Data models for Driftlist task sync
//!
//! Defines the task record shared by the store, the sync service, and the
//! client cache, plus the status filter and change-feed event types.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task in an owner's ordered list
///
/// Every read and write is scoped by `owner`; tasks have no relationships
/// to each other beyond the total order implied by `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned record id (immutable, opaque)
    pub id: String,

    /// Identity this task belongs to (immutable)
    pub owner: String,

    /// Task text, 1-200 characters after trimming
    pub text: String,

    /// Completion flag
    pub done: bool,

    /// Creation timestamp (immutable, store-assigned)
    pub created_at: DateTime<Utc>,

    /// Owner-scoped rank, ascending; absent on legacy records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Task {
    /// Compare two tasks in display order.
    ///
    /// Sorts by `order` ascending with `created_at` descending as the
    /// tiebreak for tasks sharing or lacking a rank. A missing `order`
    /// sorts as rank 0, i.e. before any assigned rank, matching the
    /// missing-field sort semantics of the original store.
    pub fn display_cmp(&self, other: &Task) -> Ordering {
        self.order
            .unwrap_or(0)
            .cmp(&other.order.unwrap_or(0))
            .then_with(|| other.created_at.cmp(&self.created_at))
    }
}

/// Sort a slice of tasks into display order.
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.display_cmp(b));
}

/// Status filter for list views
///
/// `Active` restricts to `done == false`, `Completed` to `done == true`.
/// Absence of a filter (modeled as `Option<StatusFilter>::None` at call
/// sites) means the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Active,
    Completed,
}

impl StatusFilter {
    /// Returns the string representation used in subscription parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    /// Parse a subscription parameter value.
    ///
    /// Returns `None` for anything other than `"active"` or
    /// `"completed"`; callers treat that as a malformed parameter and
    /// fail soft to an empty view.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(StatusFilter::Active),
            "completed" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    /// Check whether a task belongs to this filtered view
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::Active => !task.done,
            StatusFilter::Completed => task.done,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An incremental change to an owner's task set
///
/// The vocabulary of the change feed: the mutation service publishes one
/// event per affected record after each commit, and subscribers apply
/// them to their local mirror of the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEvent {
    /// A new task was created
    Added(Task),
    /// An existing task changed (done flag or rank)
    Updated(Task),
    /// A task was deleted
    Removed(Task),
}

impl TaskEvent {
    /// The task this event concerns
    pub fn task(&self) -> &Task {
        match self {
            TaskEvent::Added(task) | TaskEvent::Updated(task) | TaskEvent::Removed(task) => task,
        }
    }
}
