// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of storyboard edits.
//!
//! Each committed edit stores bincode snapshots of the storyboard before and
//! after it was applied. Undo restores the "before" snapshot, redo the
//! "after" one.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Maximum undo history depth
const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique edit ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditId(u64);

/// Serialized storyboard state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Bincode bytes
    pub data: Vec<u8>,
}

impl StateSnapshot {
    /// Snapshot a serializable value
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(value)?,
        })
    }

    /// Restore the value
    pub fn to_value<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// One undoable edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    /// Edit ID
    pub id: EditId,
    /// Human-readable description
    pub description: String,
    /// State before the edit
    pub before: StateSnapshot,
    /// State after the edit
    pub after: StateSnapshot,
}

impl Edit {
    fn memory_size(&self) -> usize {
        self.before.size() + self.after.size()
    }
}

/// History statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Edits on the undo stack
    pub undo_count: usize,
    /// Edits on the redo stack
    pub redo_count: usize,
    /// Bytes held by snapshots on both stacks
    pub memory_used: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Edit>,
    redo_stack: VecDeque<Edit>,
    next_id: u64,
    max_depth: usize,
    memory_used: usize,
}

impl History {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth,
            memory_used: 0,
        }
    }

    /// Record an applied edit
    pub fn record<T: Serialize>(&mut self, description: impl Into<String>, before: &T, after: &T) -> Result<EditId> {
        let id = EditId(self.next_id);
        self.next_id += 1;
        let edit = Edit {
            id,
            description: description.into(),
            before: StateSnapshot::from_value(before)?,
            after: StateSnapshot::from_value(after)?,
        };

        let discarded: usize = self.redo_stack.drain(..).map(|e| e.memory_size()).sum();
        self.memory_used = self.memory_used.saturating_sub(discarded);
        self.memory_used += edit.memory_size();
        self.undo_stack.push_back(edit);

        while self.undo_stack.len() > self.max_depth {
            if let Some(old) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old.memory_size());
            }
        }
        Ok(id)
    }

    /// Undo the last edit, returning the state to restore
    ///
    /// The edit stays on the undo stack when its snapshot cannot be decoded.
    pub fn undo<T: DeserializeOwned>(&mut self) -> Result<T> {
        let edit = self.undo_stack.back().ok_or(HistoryError::NothingToUndo)?;
        let state = edit.before.to_value()?;
        tracing::debug!("Undo {:?}: {}", edit.id, edit.description);
        if let Some(edit) = self.undo_stack.pop_back() {
            self.redo_stack.push_back(edit);
        }
        Ok(state)
    }

    /// Redo the last undone edit, returning the state to restore
    pub fn redo<T: DeserializeOwned>(&mut self) -> Result<T> {
        let edit = self.redo_stack.back().ok_or(HistoryError::NothingToRedo)?;
        let state = edit.after.to_value()?;
        tracing::debug!("Redo {:?}: {}", edit.id, edit.description);
        if let Some(edit) = self.redo_stack.pop_back() {
            self.undo_stack.push_back(edit);
        }
        Ok(state)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_used: self.memory_used,
            max_depth: self.max_depth,
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
