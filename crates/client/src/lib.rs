//! Driftlist client-side state
//!
//! The reactive cache mirroring a subscribed task view, and the drag
//! reorder state machine that overrides display order during a manual
//! reorder gesture. Pure state - rendering and the push transport are
//! external collaborators.

pub mod cache;
pub mod drag;

pub use cache::TaskCache;
pub use drag::DragReorder;
