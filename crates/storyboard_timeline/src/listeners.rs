// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bookkeeping for document-level pointer listeners.
//!
//! Every gesture installs a move/up listener pair when it starts. The host
//! mirrors the registry: it attaches real listeners for each handle and
//! detaches them when the handle is released.

use std::fmt;

/// Gesture owning a listener pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Dragging a scene block
    SceneDrag,
    /// Dragging a trim handle
    Resize,
    /// Dragging the playhead marker
    PlayheadDrag,
    /// Scrubbing the ruler
    RulerScrub,
}

/// Handle for one registered listener pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Registered listener pairs
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    active: Vec<(ListenerHandle, GestureKind)>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a move/up pair for a gesture
    pub fn register(&mut self, gesture: GestureKind) -> ListenerHandle {
        self.next_id += 1;
        let handle = ListenerHandle(self.next_id);
        self.active.push((handle, gesture));
        tracing::trace!(%handle, ?gesture, "Listeners registered");
        handle
    }

    /// Release a pair; a second release of the same handle does nothing
    pub fn release(&mut self, handle: ListenerHandle) -> bool {
        let Some(index) = self.active.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        let (_, gesture) = self.active.swap_remove(index);
        tracing::trace!(%handle, ?gesture, "Listeners released");
        true
    }

    /// Release every pair owned by a gesture kind
    pub fn release_gesture(&mut self, gesture: GestureKind) -> usize {
        let before = self.active.len();
        self.active.retain(|(_, g)| *g != gesture);
        before - self.active.len()
    }

    /// Release everything, e.g. on unmount
    pub fn release_all(&mut self) -> usize {
        let count = self.active.len();
        if count > 0 {
            tracing::debug!(count, "Releasing remaining listeners");
        }
        self.active.clear();
        count
    }

    /// Number of live pairs
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether a gesture currently holds listeners
    pub fn is_registered(&self, gesture: GestureKind) -> bool {
        self.active.iter().any(|(_, g)| *g == gesture)
    }
}
