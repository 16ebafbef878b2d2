//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::rc::Rc;

use storming_editor::HistorySummary;

/// Tracks callback invocations for testing.
///
/// Each field records calls to the corresponding callback with their arguments.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// Every summary published to history subscribers
    pub history: Rc<RefCell<Vec<HistorySummary>>>,
    /// (source, target, accepted)
    pub connect: Rc<RefCell<Vec<(String, String, bool)>>>,
    /// (node_id, x, y)
    pub drag_stopped: Rc<RefCell<Vec<(String, f32, f32)>>>,
    /// (node_id, text)
    pub label_edited: Rc<RefCell<Vec<(String, String)>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The summary published most recently.
    pub fn last_history(&self) -> Option<HistorySummary> {
        self.history.borrow().last().copied()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        self.history.borrow_mut().clear();
        self.connect.borrow_mut().clear();
        self.drag_stopped.borrow_mut().clear();
        self.label_edited.borrow_mut().clear();
    }
}
