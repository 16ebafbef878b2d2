//! Undo/redo store over opaque snapshots.
//!
//! Whether a change deserves a checkpoint is decided by the caller; every
//! [`History::push`] is unconditional.

use std::collections::VecDeque;

/// Read-only view published to history observers (e.g. a history panel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub past_len: usize,
    pub future_len: usize,
}

impl HistorySummary {
    pub fn can_undo(&self) -> bool {
        self.past_len > 0
    }

    pub fn can_redo(&self) -> bool {
        self.future_len > 0
    }
}

#[derive(Debug, Clone)]
pub struct History<T> {
    past: Vec<T>,
    present: T,
    future: VecDeque<T>,
    limit: Option<usize>,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            past: Vec::new(),
            present: initial,
            future: VecDeque::new(),
            limit: None,
        }
    }

    /// Keep at most `limit` undo steps, evicting the oldest first.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self.enforce_limit();
        self
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Oldest first.
    pub fn past(&self) -> &[T] {
        &self.past
    }

    /// Next redo first.
    pub fn future(&self) -> impl Iterator<Item = &T> + '_ {
        self.future.iter()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            past_len: self.past.len(),
            future_len: self.future.len(),
        }
    }

    /// Record a new checkpoint. Discards any redo branch.
    pub fn push(&mut self, state: T) {
        let previous = std::mem::replace(&mut self.present, state);
        self.past.push(previous);
        self.future.clear();
        self.enforce_limit();
    }

    /// Step back. Returns `false` (and changes nothing) when there is no past.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward. Returns `false` (and changes nothing) when there is no future.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        true
    }

    /// Start over from `state` with no undo or redo steps.
    pub fn reset(&mut self, state: T) {
        self.past.clear();
        self.future.clear();
        self.present = state;
    }

    /// Forget undo/redo steps but keep the present.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Replace the present checkpoint in place, without creating a new step.
    pub fn amend(&mut self, state: T) {
        self.present = state;
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.past.len() > limit {
                let excess = self.past.len() - limit;
                self.past.drain(..excess);
            }
        }
    }
}
