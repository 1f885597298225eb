//! Change feed and per-subscriber projection
//!
//! The mutation service publishes a [`TaskEvent`] per affected record
//! after each commit. [`EventBus`] fans those events out over a broadcast
//! channel; [`ListSubscription`] projects the shared feed down to one
//! subscriber's view: owner-scoped, optionally status-filtered, with
//! malformed parameters failing soft to a feed that delivers nothing.

use driftlist_db::{StatusFilter, TaskEvent};
use tokio::sync::broadcast;
use tracing::warn;

/// Capacity of the broadcast channel behind the change feed
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcasts task change events to every subscribed session
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TaskEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: TaskEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// Subscribe to the raw, unfiltered feed.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.tx.subscribe()
    }
}

/// The scope a live subscription projects the feed down to
#[derive(Debug, Clone)]
struct Scope {
    owner: String,
    status: Option<StatusFilter>,
}

/// One session's live view of an owner's task list
///
/// Anonymous subscribers and subscribers that passed an unknown status
/// value get a dead feed: [`next_event`](Self::next_event) returns `None`
/// immediately, mirroring the fail-soft empty result of the snapshot
/// query.
pub struct ListSubscription {
    scope: Option<Scope>,
    rx: broadcast::Receiver<TaskEvent>,
}

impl ListSubscription {
    /// Build a subscription for an owner (or a dead feed).
    ///
    /// # Arguments
    ///
    /// * `owner` - The authenticated owner, if any
    /// * `status` - Raw optional status parameter (`"active"` / `"completed"`)
    /// * `rx` - Receiver on the shared change feed
    pub(crate) fn new(
        owner: Option<&str>,
        status: Option<&str>,
        rx: broadcast::Receiver<TaskEvent>,
    ) -> Self {
        let scope = match (owner, status) {
            (None, _) => None,
            (Some(owner), None) => Some(Scope {
                owner: owner.to_string(),
                status: None,
            }),
            (Some(owner), Some(raw)) => StatusFilter::parse(raw).map(|filter| Scope {
                owner: owner.to_string(),
                status: Some(filter),
            }),
        };
        Self { scope, rx }
    }

    /// Whether this subscription can ever deliver an event
    pub fn is_live(&self) -> bool {
        self.scope.is_some()
    }

    /// Wait for the next event visible to this subscriber.
    ///
    /// Returns `None` when the feed is dead (anonymous caller, malformed
    /// filter) or the service has shut down. A lagged receiver skips the
    /// overwritten events and keeps going; resynchronization after loss
    /// is the transport's job.
    pub async fn next_event(&mut self) -> Option<TaskEvent> {
        self.scope.as_ref()?;
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if let Some(projected) = self.project(event) {
                        return Some(projected);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Subscription lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Project a raw feed event into this subscriber's view.
    ///
    /// Events for other owners vanish. Under a status filter, an update
    /// that moves a task out of the filtered set is delivered as a
    /// removal, and an addition outside the set is dropped; removals
    /// always pass so a subscriber can never hold a stale record.
    fn project(&self, event: TaskEvent) -> Option<TaskEvent> {
        let scope = self.scope.as_ref()?;
        if event.task().owner != scope.owner {
            return None;
        }
        let Some(filter) = scope.status else {
            return Some(event);
        };
        match event {
            TaskEvent::Added(task) => filter.matches(&task).then_some(TaskEvent::Added(task)),
            TaskEvent::Updated(task) => {
                if filter.matches(&task) {
                    Some(TaskEvent::Updated(task))
                } else {
                    Some(TaskEvent::Removed(task))
                }
            }
            TaskEvent::Removed(task) => Some(TaskEvent::Removed(task)),
        }
    }
}
