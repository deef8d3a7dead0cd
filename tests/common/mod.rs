//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint::SharedString;
use slint_pending_connection::{ElementId, PendingConnection};
use std::cell::RefCell;
use std::rc::Rc;

/// Records what a [`PendingConnection`] reports through its observers.
#[derive(Default, Clone)]
pub struct Recorder {
    /// (source, target) for every processed completion
    pub completed: Rc<RefCell<Vec<(Option<ElementId>, Option<ElementId>)>>>,
    /// Every visibility change, in order
    pub visibility: Rc<RefCell<Vec<bool>>>,
    /// Every preview target change, in order
    pub previews: Rc<RefCell<Vec<Option<SharedString>>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook the recorder up to a pending connection.
    pub fn observe(&self, pending: &PendingConnection<SharedString>) {
        pending.on_connection_completed({
            let completed = self.completed.clone();
            move |source, target| completed.borrow_mut().push((source, target))
        });
        pending.on_visible_changed({
            let visibility = self.visibility.clone();
            move |visible| visibility.borrow_mut().push(visible)
        });
        pending.on_preview_target_changed({
            let previews = self.previews.clone();
            move |preview| previews.borrow_mut().push(preview.cloned())
        });
    }

    /// Clear everything recorded so far.
    pub fn clear(&self) {
        self.completed.borrow_mut().clear();
        self.visibility.borrow_mut().clear();
        self.previews.borrow_mut().clear();
    }
}
