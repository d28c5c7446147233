//! Undo/redo over whole annotation-set snapshots.
//!
//! Snapshots are taken lazily: nothing is recorded when a stroke is
//! committed. `undo` snapshots the current set onto the redo stack before
//! dropping the topmost stroke, and `redo` restores the most recent snapshot.
//! The undo-side stack only records the set each redo replaced.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::doc::AnnotationSet;

/// Snapshot stacks for one annotation set.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<AnnotationSet>,
    redo_stack: Vec<AnnotationSet>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the topmost stroke from `current`. Returns `false` if `current` was empty.
    pub fn undo(&mut self, current: &mut AnnotationSet) -> bool {
        if current.is_empty() {
            return false;
        }
        let previous = current.without_last();
        self.redo_stack.push(std::mem::replace(current, previous));
        true
    }

    /// Restore the most recent undone snapshot into `current`. Returns `false` if there is none.
    pub fn redo(&mut self, current: &mut AnnotationSet) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(std::mem::replace(current, snapshot));
        true
    }

    /// A fresh commit invalidates anything that could be redone.
    pub fn on_commit(&mut self) {
        self.redo_stack.clear();
    }

    /// Forget every snapshot.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Whether `redo` would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots waiting to be redone.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Number of sets replaced by redo.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}
