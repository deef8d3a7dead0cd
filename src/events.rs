//! Pending-connection lifecycle events and the per-editor channel that carries them.
//!
//! A connector raises [`PendingConnectionEvent::Started`] once, then
//! [`PendingConnectionEvent::Drag`] for every pointer move, then exactly one
//! [`PendingConnectionEvent::Completed`]. Events are routed through the editor's
//! [`EventChannel`] so any number of listeners (typically one
//! [`PendingConnection`](crate::PendingConnection)) observe the same stream.
//!
//! # Example
//!
//! ```
//! use slint_pending_connection::{EventChannel, PendingConnectionEvent, PendingConnectionEventArgs, Point};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let channel = EventChannel::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sub = channel.subscribe({
//!     let seen = seen.clone();
//!     move |event: &PendingConnectionEvent| seen.borrow_mut().push(event.args().anchor)
//! });
//!
//! channel.publish(PendingConnectionEvent::Drag(PendingConnectionEventArgs::new(Point::new(1.0, 2.0))));
//! assert_eq!(*seen.borrow(), vec![Point::new(1.0, 2.0)]);
//!
//! channel.unsubscribe(sub);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::geometry::Point;
use crate::tree::ElementId;

/// Payload shared by all three lifecycle events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PendingConnectionEventArgs {
    /// Anchor of the originating connector, in editor space.
    pub anchor: Point,
    /// Pointer offset from `anchor`.
    pub offset_x: f32,
    pub offset_y: f32,
    /// The connector the gesture started from.
    pub source_connector: Option<ElementId>,
    /// Where the gesture was released. Only meaningful for `Completed`.
    pub target_connector: Option<ElementId>,
}

impl PendingConnectionEventArgs {
    pub fn new(anchor: Point) -> Self {
        Self { anchor, ..Default::default() }
    }

    pub fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn with_source(mut self, source: ElementId) -> Self {
        self.source_connector = Some(source);
        self
    }

    pub fn with_target(mut self, target: Option<ElementId>) -> Self {
        self.target_connector = target;
        self
    }

    /// `anchor + (offset_x, offset_y)`: where the pointer currently is.
    pub fn pointer(&self) -> Point {
        self.anchor.offset(self.offset_x, self.offset_y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PendingConnectionEvent {
    Started(PendingConnectionEventArgs),
    Drag(PendingConnectionEventArgs),
    Completed(PendingConnectionEventArgs),
}

impl PendingConnectionEvent {
    pub fn args(&self) -> &PendingConnectionEventArgs {
        match self {
            Self::Started(args) | Self::Drag(args) | Self::Completed(args) => args,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Started(_) => "started",
            Self::Drag(_) => "drag",
            Self::Completed(_) => "completed",
        }
    }
}

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&PendingConnectionEvent)>;

/// Single-threaded publish/subscribe channel for pending-connection events.
///
/// Handlers run synchronously in subscription order. Publishing from inside a
/// handler does not recurse: the event is queued and delivered after the
/// current one has reached every handler, so all listeners see the same order.
/// Handlers may subscribe or unsubscribe while an event is being delivered;
/// the change applies from the next event on.
#[derive(Default)]
pub struct EventChannel {
    handlers: RefCell<Vec<(SubscriptionId, Handler)>>,
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<PendingConnectionEvent>>,
    dispatching: Cell<bool>,
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.handlers.borrow().len())
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&PendingConnectionEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn publish(&self, event: PendingConnectionEvent) {
        self.queue.borrow_mut().push_back(event);
        if self.dispatching.replace(true) {
            return;
        }
        let _guard = DispatchGuard(self);

        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else { break };
            // Snapshot so handlers can (un)subscribe without a borrow conflict
            let handlers: Vec<Handler> = self
                .handlers
                .borrow()
                .iter()
                .map(|(_, h)| h.clone())
                .collect();
            for handler in handlers {
                handler(&event);
            }
        }
    }
}

/// Ends a dispatch loop, also when a handler panics. Events queued behind the
/// one that panicked are dropped so the channel starts clean.
struct DispatchGuard<'a>(&'a EventChannel);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let dropped = std::mem::take(&mut *self.0.queue.borrow_mut());
            if !dropped.is_empty() {
                log::warn!("dropping {} queued pending connection events after a handler panicked", dropped.len());
            }
        }
        self.0.dispatching.set(false);
    }
}
