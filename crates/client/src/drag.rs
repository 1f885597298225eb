//! Drag reorder state machine
//!
//! Ephemeral, per-session state driving the optimistic UI during a
//! manual reorder gesture. On gesture start it snapshots the current id
//! sequence as an override; drag-over events rearrange the override; a
//! drop hands the final sequence to the caller to emit as a reorder
//! call. Until the call settles, the override - not the canonical cache
//! - is authoritative for rendering, so the server's unconfirmed echo
//! cannot make the list flicker. Never shared, never persisted.

use driftlist_db::Task;

/// Phase of the reorder gesture
#[derive(Debug, Clone, PartialEq, Eq)]
enum DragState {
    /// No gesture in progress; the canonical cache drives rendering
    Idle,
    /// A gesture is in progress; `sequence` is the override
    Dragging { dragged: String, sequence: Vec<String> },
    /// The gesture dropped and the reorder call is in flight
    Committing { sequence: Vec<String> },
}

/// State machine for one session's drag reorder gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragReorder {
    state: DragState,
}

impl Default for DragReorder {
    fn default() -> Self {
        Self::new()
    }
}

impl DragReorder {
    /// Create the machine in its idle state
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    /// Start a gesture, snapshotting the current full id sequence.
    ///
    /// Ignored unless idle and `dragged` is present in `sequence`.
    /// Returns whether the gesture started.
    pub fn begin(&mut self, dragged: &str, sequence: &[String]) -> bool {
        if self.state != DragState::Idle {
            return false;
        }
        if !sequence.iter().any(|id| id == dragged) {
            return false;
        }
        self.state = DragState::Dragging {
            dragged: dragged.to_string(),
            sequence: sequence.to_vec(),
        };
        true
    }

    /// Handle a drag-over / touch-move hit on another item.
    ///
    /// Removes the dragged id from the override and reinserts it at the
    /// hovered item's position. Ignored while not dragging, when
    /// hovering the dragged item itself, or when the target left the
    /// sequence.
    pub fn move_over(&mut self, target: &str) {
        let DragState::Dragging { dragged, sequence } = &mut self.state else {
            return;
        };
        if target == dragged {
            return;
        }
        let Some(from) = sequence.iter().position(|id| id == dragged) else {
            return;
        };
        let held = sequence.remove(from);
        match sequence.iter().position(|id| id == target) {
            Some(to) => sequence.insert(to, held),
            // Target vanished mid-gesture; put the item back
            None => sequence.insert(from, held),
        }
    }

    /// Drop the item, yielding the sequence to send as a reorder call.
    ///
    /// The override stays authoritative until [`settle`](Self::settle)
    /// is called once the round trip completes (or fails). Returns
    /// `None` when no gesture was in progress.
    pub fn commit(&mut self) -> Option<Vec<String>> {
        let DragState::Dragging { sequence, .. } = &self.state else {
            return None;
        };
        let sequence = sequence.clone();
        self.state = DragState::Committing {
            sequence: sequence.clone(),
        };
        Some(sequence)
    }

    /// Cancel an in-progress gesture, discarding the override.
    ///
    /// No call is emitted. Ignored unless dragging.
    pub fn cancel(&mut self) {
        if matches!(self.state, DragState::Dragging { .. }) {
            self.state = DragState::Idle;
        }
    }

    /// Discard the override after the reorder round trip completes.
    ///
    /// Called on both success (the canonical feed now reflects the new
    /// order) and failure (the canonical order stands).
    pub fn settle(&mut self) {
        if matches!(self.state, DragState::Committing { .. }) {
            self.state = DragState::Idle;
        }
    }

    /// Whether the override is currently authoritative for rendering
    pub fn is_overriding(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// The id being dragged, while a gesture is in progress
    pub fn dragged_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { dragged, .. } => Some(dragged),
            _ => None,
        }
    }

    /// The current override sequence, if any
    pub fn override_sequence(&self) -> Option<&[String]> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { sequence, .. } | DragState::Committing { sequence } => {
                Some(sequence)
            }
        }
    }

    /// Order canonical tasks for display.
    ///
    /// With no active override this is the input order. With one, tasks
    /// are arranged by the override sequence; override ids that left the
    /// cache are skipped and cache tasks unknown to the override (pushed
    /// by the server mid-gesture) are appended in their canonical order.
    pub fn overlay<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let Some(sequence) = self.override_sequence() else {
            return tasks.iter().collect();
        };
        let mut ordered: Vec<&Task> = sequence
            .iter()
            .filter_map(|id| tasks.iter().find(|t| &t.id == id))
            .collect();
        for task in tasks {
            if !sequence.contains(&task.id) {
                ordered.push(task);
            }
        }
        ordered
    }
}
