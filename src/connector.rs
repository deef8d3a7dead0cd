//! Pointer gesture on a connector that produces pending-connection events.
//!
//! [`ConnectorDrag`] is the event source side of the protocol: wire the
//! connector's pointer callbacks to it and it raises `Started`, `Drag` and
//! `Completed` on the editor's channel.
//!
//! # Example
//!
//! ```ignore
//! let drag = ConnectorDrag::new(editor.clone());
//!
//! window.on_pin_pressed({
//!     let drag = drag.clone();
//!     move |pin, x, y| { let _ = drag.pointer_pressed(ElementId(pin as u32), Point::new(x, y)); }
//! });
//! window.on_pointer_moved(drag.pointer_moved_callback());
//! window.on_pointer_released(drag.pointer_released_callback());
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::editor::NodeEditor;
use crate::error::TreeError;
use crate::events::{PendingConnectionEvent, PendingConnectionEventArgs};
use crate::geometry::Point;
use crate::tree::ElementId;

#[derive(Clone, Copy, Debug)]
struct ActiveDrag {
    source: ElementId,
    anchor: Point,
}

/// Turns press/move/release on a connector into pending-connection events.
///
/// Clone this to share it across callbacks.
pub struct ConnectorDrag<D = ()> {
    editor: Rc<NodeEditor<D>>,
    active: Rc<Cell<Option<ActiveDrag>>>,
}

impl<D> Clone for ConnectorDrag<D> {
    fn clone(&self) -> Self {
        Self {
            editor: self.editor.clone(),
            active: self.active.clone(),
        }
    }
}

impl<D> ConnectorDrag<D> {
    pub fn new(editor: Rc<NodeEditor<D>>) -> Self {
        Self {
            editor,
            active: Rc::new(Cell::new(None)),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.get().is_some()
    }

    /// The connector the current gesture started from.
    pub fn source(&self) -> Option<ElementId> {
        self.active.get().map(|a| a.source)
    }

    /// Begin a gesture on `connector`. A press while a gesture is running is ignored.
    ///
    /// The connector's anchor is recomputed first so the event carries its
    /// current position.
    pub fn pointer_pressed(&self, connector: ElementId, position: Point) -> Result<(), TreeError> {
        if self.is_dragging() {
            log::debug!("ignoring press on {:?}: a connection gesture is already running", connector);
            return Ok(());
        }

        let anchor = self.editor.tree_mut().update_anchor(connector).map_err(|err| {
            log::warn!("cannot start a connection from {:?}: {}", connector, err);
            err
        })?;
        self.editor.set_pointer_position(position);
        self.active.set(Some(ActiveDrag { source: connector, anchor }));

        let delta = position - anchor;
        self.editor.raise(PendingConnectionEvent::Started(
            PendingConnectionEventArgs::new(anchor)
                .with_offset(delta.x, delta.y)
                .with_source(connector),
        ));
        Ok(())
    }

    /// Track the pointer. Raises `Drag` only while a gesture is running.
    pub fn pointer_moved(&self, position: Point) {
        self.editor.set_pointer_position(position);
        if let Some(active) = self.active.get() {
            self.editor
                .raise(PendingConnectionEvent::Drag(self.args(active, position)));
        }
    }

    /// Finish the gesture and return the element it was released over.
    ///
    /// The target is resolved with the editor's shared allow-only-connectors flag,
    /// so it agrees with what the pending connection highlighted.
    pub fn pointer_released(&self, position: Point) -> Option<ElementId> {
        let active = self.active.take()?;
        self.editor.set_pointer_position(position);

        let target = self
            .editor
            .element_under_pointer(self.editor.allow_only_connectors());
        self.editor.raise(PendingConnectionEvent::Completed(
            self.args(active, position).with_target(target),
        ));
        target
    }

    /// Abort the gesture (escape key, lost pointer capture). Completes with no target.
    pub fn cancel(&self) {
        if let Some(active) = self.active.take() {
            let position = self.editor.pointer_position();
            self.editor.raise(PendingConnectionEvent::Completed(
                self.args(active, position).with_target(None),
            ));
        }
    }

    fn args(&self, active: ActiveDrag, position: Point) -> PendingConnectionEventArgs {
        let delta = position - active.anchor;
        PendingConnectionEventArgs::new(active.anchor)
            .with_offset(delta.x, delta.y)
            .with_source(active.source)
    }
}

impl<D: 'static> ConnectorDrag<D> {
    /// Returns a callback for a `pointer-moved(x, y)` Slint callback.
    pub fn pointer_moved_callback(&self) -> impl Fn(f32, f32) {
        let drag = self.clone();
        move |x, y| drag.pointer_moved(Point::new(x, y))
    }

    /// Returns a callback for a `pointer-released(x, y)` Slint callback.
    pub fn pointer_released_callback(&self) -> impl Fn(f32, f32) {
        let drag = self.clone();
        move |x, y| {
            drag.pointer_released(Point::new(x, y));
        }
    }
}
