//! The mutation service for owner-scoped task lists
//!
//! Every mutating call runs the same pipeline: authenticate, admit
//! through the rate limiter, validate, mutate the store, publish change
//! events. Events are published only after the store commit, so no
//! subscriber can observe a partially-applied mutation. There is no
//! cross-call locking; correctness relies on per-document atomicity (and
//! one transaction for the reorder batch) plus owner scoping.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use driftlist_db::{
    Database, OrderChange, StatusFilter, Task, TaskEvent, TaskRepository, sort_for_display,
};

use crate::auth::Session;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::limiter::RateLimiter;
use crate::subscription::{EventBus, ListSubscription};

/// Maximum task text length in characters, after trimming
pub const MAX_TEXT_LEN: usize = 200;

/// The task service: mutations, snapshots, and live subscriptions
pub struct TaskService {
    db: Database,
    limiter: RateLimiter,
    events: EventBus,
    limit_reorder: bool,
}

impl TaskService {
    /// Create a service over a connected, initialized database.
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        Self {
            db,
            limiter: RateLimiter::new(config.rate_limit),
            events: EventBus::new(),
            limit_reorder: config.limit_reorder,
        }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    fn repo(&self) -> TaskRepository<'_> {
        TaskRepository::new(self.db.client())
    }

    /// Admit a mutating call for an owner or fail `RateLimited`.
    fn admit(&self, owner: &str) -> ServiceResult<()> {
        if self.limiter.admit(owner) {
            Ok(())
        } else {
            Err(ServiceError::RateLimited)
        }
    }

    /// Create a new task at the end of the caller's list.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` without a session identity, `RateLimited` over
    /// quota, `Empty` when the trimmed text is empty, `TooLong` past 200
    /// characters.
    pub async fn insert(&self, session: &Session, text: &str) -> ServiceResult<String> {
        let owner = session.require_owner()?;
        self.admit(owner)?;

        let clean = text.trim();
        if clean.is_empty() {
            return Err(ServiceError::Empty);
        }
        if clean.chars().count() > MAX_TEXT_LEN {
            return Err(ServiceError::TooLong);
        }

        let repo = self.repo();
        let order = repo.next_order(owner).await?;
        let task = repo.insert(owner, clean, order).await?;
        debug!("Owner {} inserted task {} at rank {}", owner, task.id, order);

        let id = task.id.clone();
        self.events.publish(TaskEvent::Added(task));
        Ok(id)
    }

    /// Flip the done flag of a caller-owned task.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is missing or owned by someone else - the
    /// two are deliberately indistinguishable.
    pub async fn toggle(&self, session: &Session, id: &str) -> ServiceResult<()> {
        let owner = session.require_owner()?;
        self.admit(owner)?;

        let repo = self.repo();
        let Some(mut task) = repo.get_owned(owner, id).await? else {
            return Err(ServiceError::NotFound);
        };
        task.done = !task.done;
        repo.set_done(id, task.done).await?;
        debug!("Owner {} toggled task {} to done = {}", owner, id, task.done);

        self.events.publish(TaskEvent::Updated(task));
        Ok(())
    }

    /// Delete a caller-owned task.
    ///
    /// Removing an id that is absent or not owned is a silent no-op.
    /// (Observed behavior preserved as intentional idempotence - a
    /// product decision to confirm, not silently fix.)
    pub async fn remove(&self, session: &Session, id: &str) -> ServiceResult<()> {
        let owner = session.require_owner()?;
        self.admit(owner)?;

        if let Some(task) = self.repo().delete_owned(owner, id).await? {
            debug!("Owner {} removed task {}", owner, id);
            self.events.publish(TaskEvent::Removed(task));
        }
        Ok(())
    }

    /// Delete every completed task of the caller in one bulk step.
    pub async fn clear_completed(&self, session: &Session) -> ServiceResult<()> {
        let owner = session.require_owner()?;
        self.admit(owner)?;

        let removed = self.repo().clear_completed(owner).await?;
        debug!("Owner {} cleared {} completed tasks", owner, removed.len());
        for task in removed {
            self.events.publish(TaskEvent::Removed(task));
        }
        Ok(())
    }

    /// Rewrite the caller's ranks to match an ordered id sequence.
    ///
    /// Each id gets `order = position + 1` (1-based). Owned tasks absent
    /// from the payload are appended after it, in their prior relative
    /// order, all at `order = len + 1` - those ranks can collide, a
    /// documented simplification of the partial-payload case. The batch
    /// commits as one transaction and events flow only afterwards, so
    /// subscribers never see a half-rewritten list.
    ///
    /// # Errors
    ///
    /// `InvalidOrder` when any id falls outside the caller's owned set;
    /// nothing is written in that case.
    pub async fn reorder(&self, session: &Session, ordered_ids: &[String]) -> ServiceResult<()> {
        let owner = session.require_owner()?;
        if self.limit_reorder {
            self.admit(owner)?;
        }

        let repo = self.repo();
        let tasks = repo.list_owned(owner).await?;
        let owned: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        if ordered_ids.iter().any(|id| !owned.contains(id.as_str())) {
            return Err(ServiceError::InvalidOrder);
        }

        // Duplicate ids in the payload: the last occurrence wins
        let positions: HashMap<&str, u32> = ordered_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_str(), index as u32 + 1))
            .collect();
        let appended_rank = ordered_ids.len() as u32 + 1;

        // Iterating prior display order keeps omitted tasks in their
        // previous relative sequence
        let changes: Vec<OrderChange> = tasks
            .iter()
            .map(|task| OrderChange {
                id: task.id.clone(),
                order: positions
                    .get(task.id.as_str())
                    .copied()
                    .unwrap_or(appended_rank),
            })
            .collect();

        repo.write_orders(owner, &changes).await?;
        debug!("Owner {} reordered {} tasks", owner, changes.len());

        let ranks: HashMap<&str, u32> = changes
            .iter()
            .map(|change| (change.id.as_str(), change.order))
            .collect();
        let mut updated: Vec<Task> = tasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                task.order = ranks.get(task.id.as_str()).copied();
                task
            })
            .collect();
        sort_for_display(&mut updated);
        for task in updated {
            self.events.publish(TaskEvent::Updated(task));
        }
        Ok(())
    }

    /// Snapshot of the caller's view: own tasks only, status-filtered,
    /// sorted by rank ascending with newest-first tiebreak.
    ///
    /// Fails soft: anonymous callers and unknown status values get an
    /// empty list, never an error.
    pub async fn list(&self, session: &Session, status: Option<&str>) -> ServiceResult<Vec<Task>> {
        let Some(owner) = session.owner() else {
            return Ok(Vec::new());
        };
        let filter = match status {
            None => None,
            Some(raw) => match StatusFilter::parse(raw) {
                Some(filter) => Some(filter),
                None => return Ok(Vec::new()),
            },
        };

        let mut tasks = self.repo().list_owned(owner).await?;
        if let Some(filter) = filter {
            tasks.retain(|task| filter.matches(task));
        }
        Ok(tasks)
    }

    /// Open a live subscription on the caller's view.
    ///
    /// Anonymous callers and unknown status values get a dead feed that
    /// delivers nothing (fail-soft, like [`list`](Self::list)).
    pub fn subscribe(&self, session: &Session, status: Option<&str>) -> ListSubscription {
        ListSubscription::new(session.owner(), status, self.events.subscribe())
    }
}

// The service handle is shared across connection handlers
static_assertions::assert_impl_all!(TaskService: Send, Sync);
