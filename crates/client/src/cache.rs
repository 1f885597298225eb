//! Local mirror of the subscribed task view
//!
//! Kept current purely by server push: a snapshot seeds it, change
//! events patch it. The cache enforces nothing beyond display order -
//! the server owns every invariant.

use driftlist_db::{StatusFilter, Task, TaskEvent, sort_for_display};

/// Client-side mirror of an owner's sorted task list
#[derive(Debug, Default, Clone)]
pub struct TaskCache {
    tasks: Vec<Task>,
}

impl TaskCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire cache with a snapshot, resorting it.
    pub fn replace(&mut self, snapshot: Vec<Task>) {
        self.tasks = snapshot;
        sort_for_display(&mut self.tasks);
    }

    /// Apply one change event from the feed.
    ///
    /// Additions and updates upsert by id; removals drop the record.
    /// The cache is resorted after every upsert so rank rewrites take
    /// effect immediately.
    pub fn apply(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Added(task) | TaskEvent::Updated(task) => {
                match self.tasks.iter_mut().find(|t| t.id == task.id) {
                    Some(existing) => *existing = task,
                    None => self.tasks.push(task),
                }
                sort_for_display(&mut self.tasks);
            }
            TaskEvent::Removed(task) => {
                self.tasks.retain(|t| t.id != task.id);
            }
        }
    }

    /// All cached tasks in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The cached id sequence in display order.
    ///
    /// This is the sequence a drag gesture snapshots as its override.
    pub fn ids(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.id.clone()).collect()
    }

    /// The canonical done-based partition of the full cache.
    ///
    /// Always reflects the cached records themselves, never any drag
    /// override - partial-view reordering is out of scope.
    pub fn filtered(&self, filter: StatusFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Number of open tasks
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.done).count()
    }

    /// Number of completed tasks
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.done).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn task(id: &str, order: u32, done: bool) -> Task {
        Task {
            id: id.to_string(),
            owner: "ada".to_string(),
            text: format!("task {}", id),
            done,
            created_at: Utc.timestamp_opt(order as i64, 0).unwrap(),
            order: Some(order),
        }
    }

    #[test]
    fn test_replace_sorts_snapshot() {
        let mut cache = TaskCache::new();
        cache.replace(vec![task("b", 2, false), task("a", 1, false)]);
        assert_eq!(cache.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_apply_added_inserts_in_order() {
        let mut cache = TaskCache::new();
        cache.replace(vec![task("a", 1, false), task("c", 3, false)]);

        cache.apply(TaskEvent::Added(task("b", 2, false)));
        assert_eq!(cache.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_apply_updated_resorts_on_rank_change() {
        let mut cache = TaskCache::new();
        cache.replace(vec![task("a", 1, false), task("b", 2, false)]);

        let mut moved = task("b", 2, false);
        moved.order = Some(1);
        let mut pushed = task("a", 1, false);
        pushed.order = Some(2);
        cache.apply(TaskEvent::Updated(moved));
        cache.apply(TaskEvent::Updated(pushed));

        assert_eq!(cache.ids(), vec!["b", "a"]);
    }

    #[test]
    fn test_apply_removed_drops_record() {
        let mut cache = TaskCache::new();
        cache.replace(vec![task("a", 1, false), task("b", 2, false)]);

        cache.apply(TaskEvent::Removed(task("a", 1, false)));
        assert_eq!(cache.ids(), vec!["b"]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_apply_removed_unknown_id_is_noop() {
        let mut cache = TaskCache::new();
        cache.replace(vec![task("a", 1, false)]);

        cache.apply(TaskEvent::Removed(task("ghost", 9, false)));
        assert_eq!(cache.ids(), vec!["a"]);
    }

    #[test]
    fn test_filtered_partitions_by_done() {
        let mut cache = TaskCache::new();
        cache.replace(vec![
            task("open1", 1, false),
            task("done1", 2, true),
            task("open2", 3, false),
        ]);

        let active: Vec<&str> = cache
            .filtered(StatusFilter::Active)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(active, vec!["open1", "open2"]);

        let completed: Vec<&str> = cache
            .filtered(StatusFilter::Completed)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(completed, vec!["done1"]);
    }

    #[test]
    fn test_counts() {
        let mut cache = TaskCache::new();
        assert_eq!(cache.active_count(), 0);
        assert_eq!(cache.completed_count(), 0);
        assert!(cache.is_empty());

        cache.replace(vec![
            task("a", 1, false),
            task("b", 2, true),
            task("c", 3, true),
        ]);
        assert_eq!(cache.active_count(), 1);
        assert_eq!(cache.completed_count(), 2);
    }
}
