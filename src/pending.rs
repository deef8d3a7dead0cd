//! The pending connection: the link being dragged before it is committed.
//!
//! [`PendingConnection`] listens to an editor's lifecycle events and keeps the
//! observable state the rendering layer draws from: the source and target
//! anchors, visibility, and the hovered candidate's preview data.
//!
//! # State machine
//!
//! - **Idle → Pending** on `Started`: remember the source, become visible, put
//!   both anchors at the start position.
//! - **Pending → Pending** on `Drag`: follow the pointer. With preview or snapping
//!   enabled, hit test under the pointer; snapping locks the end onto the
//!   candidate connector's anchor; a new candidate moves the hover flag.
//! - **Pending → Idle** on `Completed`: hide, publish the target, release the hover flag.
//!
//! `Drag` and `Completed` while Idle are ignored. `Started` while Pending
//! resets the session. At most one element carries this connection's hover
//! flag, and it is released on every transition to Idle, including
//! [`detach`](PendingConnection::detach) and dropping the last handle.
//!
//! Observers run only after an event's state is fully written, so they may
//! call back into the controller. If one detaches or restarts the session, the
//! remaining notifications for the old session (and its completion handlers)
//! are skipped.
//!
//! # Example
//!
//! ```
//! use slint_pending_connection::*;
//! use std::rc::Rc;
//!
//! let editor: Rc<NodeEditor> = Rc::new(NodeEditor::new());
//! let node = editor.add_element(editor.root(), ElementKind::ItemContainer, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
//! let pin = editor.add_element(node, ElementKind::Connector, Rect::new(94.0, 44.0, 12.0, 12.0)).unwrap();
//!
//! let pending = PendingConnection::new(PendingConnectionConfig::new().with_snapping(true));
//! pending.attach(&editor);
//!
//! let drag = ConnectorDrag::new(editor.clone());
//! drag.pointer_pressed(pin, Point::new(100.0, 50.0)).unwrap();
//! assert!(pending.is_visible());
//!
//! drag.pointer_moved(Point::new(180.0, 90.0));
//! assert_eq!(pending.target_anchor(), Point::new(180.0, 90.0));
//!
//! drag.pointer_released(Point::new(180.0, 90.0));
//! assert!(!pending.is_visible());
//! assert_eq!(pending.target(), None);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use slint::{ModelRc, SharedString, VecModel};

use crate::config::{validate_dash_array, validate_stroke_thickness, PendingConnectionConfig};
use crate::editor::NodeEditor;
use crate::error::ConfigError;
use crate::events::{PendingConnectionEvent, PendingConnectionEventArgs, SubscriptionId};
use crate::geometry::Point;
use crate::observable::Property;
use crate::path::generate_bezier_path;
use crate::tree::{ElementId, ElementKind};

type CompletedHandler = Rc<dyn Fn(Option<ElementId>, Option<ElementId>)>;
type AnchorListener = Rc<dyn Fn(Point, Point)>;

struct Inner<D> {
    source: Property<Option<ElementId>>,
    target: Property<Option<ElementId>>,
    preview_target: Property<Option<D>>,
    source_anchor: Cell<Point>,
    target_anchor: Cell<Point>,
    is_visible: Property<bool>,
    stroke_thickness: Property<f32>,
    stroke_dash_array: Property<Vec<f32>>,

    enable_preview: Cell<bool>,
    enable_snapping: Cell<bool>,
    allow_only_connectors: Cell<bool>,
    bezier_offset: Cell<f32>,

    hovered: Cell<Option<ElementId>>,
    /// Bumped on every start, completion and detach.
    session: Cell<u64>,
    editor: RefCell<Weak<NodeEditor<D>>>,
    subscription: Cell<Option<SubscriptionId>>,
    anchor_listeners: RefCell<Vec<AnchorListener>>,
    completed_handlers: RefCell<Vec<CompletedHandler>>,
}

/// Observable values one event changed. Listeners hear about them only once
/// every write for that event is done.
#[derive(Default)]
struct Changes {
    source: bool,
    target: bool,
    anchors: bool,
    preview: bool,
    visible: bool,
}

impl<D> Inner<D> {
    fn editor(&self) -> Option<Rc<NodeEditor<D>>> {
        self.editor.borrow().upgrade()
    }

    /// Clear the hover flag this session set, if any.
    fn release_hover(&self) {
        if let Some(prev) = self.hovered.take() {
            if let Some(editor) = self.editor() {
                editor.set_is_over_element(prev, false);
            }
        }
    }

    fn next_session(&self) {
        self.session.set(self.session.get().wrapping_add(1));
    }

    fn store_anchors(&self, source: Point, target: Point) -> bool {
        let source_moved = self.source_anchor.replace(source) != source;
        let target_moved = self.target_anchor.replace(target) != target;
        source_moved || target_moved
    }

    fn notify_anchors(&self) {
        let (source, target) = (self.source_anchor.get(), self.target_anchor.get());
        let listeners: Vec<AnchorListener> = self.anchor_listeners.borrow().clone();
        for listener in listeners {
            listener(source, target);
        }
    }
}

impl<D: Clone + PartialEq> Inner<D> {
    /// Fire the listeners for `changes`, visibility last.
    ///
    /// Stops and returns `false` once a listener starts a new session or
    /// detaches; whatever is left to report belongs to a session that is over.
    fn notify(&self, changes: &Changes) -> bool {
        let session = self.session.get();
        let steps: [(bool, &dyn Fn()); 5] = [
            (changes.source, &|| self.source.notify()),
            (changes.target, &|| self.target.notify()),
            (changes.anchors, &|| self.notify_anchors()),
            (changes.preview, &|| self.preview_target.notify()),
            (changes.visible, &|| self.is_visible.notify()),
        ];
        for (changed, notify) in steps {
            if self.session.get() != session {
                return false;
            }
            if changed {
                notify();
            }
        }
        self.session.get() == session
    }
}

impl<D> Drop for Inner<D> {
    fn drop(&mut self) {
        self.release_hover();
        if let (Some(editor), Some(id)) = (self.editor(), self.subscription.take()) {
            editor.events().unsubscribe(id);
        }
    }
}

/// Controller for the link being dragged out of a connector.
///
/// `D` is the per-element context data of the editor; the hovered candidate's
/// context becomes the [`preview_target`](Self::preview_target).
///
/// Clone this to share it across callbacks; all clones drive the same session.
pub struct PendingConnection<D = ()> {
    inner: Rc<Inner<D>>,
}

impl<D> Clone for PendingConnection<D> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<D: Clone + PartialEq + 'static> Default for PendingConnection<D> {
    fn default() -> Self {
        Self::new(PendingConnectionConfig::default())
    }
}

impl<D: Clone + PartialEq + 'static> PendingConnection<D> {
    /// Create a detached controller. Invalid stroke settings fall back to the defaults.
    pub fn new(config: PendingConnectionConfig) -> Self {
        let defaults = PendingConnectionConfig::default();
        let stroke_thickness = match validate_stroke_thickness(config.stroke_thickness) {
            Ok(()) => config.stroke_thickness,
            Err(err) => {
                log::warn!("{}; using {}", err, defaults.stroke_thickness);
                defaults.stroke_thickness
            }
        };
        let stroke_dash_array = match validate_dash_array(&config.stroke_dash_array) {
            Ok(()) => config.stroke_dash_array,
            Err(err) => {
                log::warn!("{}; using a solid stroke", err);
                defaults.stroke_dash_array
            }
        };

        Self {
            inner: Rc::new(Inner {
                source: Property::new(None),
                target: Property::new(None),
                preview_target: Property::new(None),
                source_anchor: Cell::new(Point::ZERO),
                target_anchor: Cell::new(Point::ZERO),
                is_visible: Property::new(false),
                stroke_thickness: Property::new(stroke_thickness),
                stroke_dash_array: Property::new(stroke_dash_array),
                enable_preview: Cell::new(config.enable_preview),
                enable_snapping: Cell::new(config.enable_snapping),
                allow_only_connectors: Cell::new(config.allow_only_connectors),
                bezier_offset: Cell::new(50.0),
                hovered: Cell::new(None),
                session: Cell::new(0),
                editor: RefCell::new(Weak::new()),
                subscription: Cell::new(None),
                anchor_listeners: RefCell::new(Vec::new()),
                completed_handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    // === Attachment ===

    /// Start listening to `editor`'s lifecycle events.
    ///
    /// Attaching to another editor detaches from the current one first. The
    /// editor's shared allow-only-connectors flag is set from this controller.
    pub fn attach(&self, editor: &Rc<NodeEditor<D>>) {
        if self.is_attached() {
            self.detach();
        }

        let weak = Rc::downgrade(&self.inner);
        let id = editor.events().subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                PendingConnection { inner }.handle_event(event);
            }
        });

        *self.inner.editor.borrow_mut() = Rc::downgrade(editor);
        self.inner.subscription.set(Some(id));
        editor.set_allow_only_connectors(self.inner.allow_only_connectors.get());
        log::debug!("pending connection attached");
    }

    /// Stop listening and reset to Idle, releasing any hover flag.
    ///
    /// Safe to call any number of times; events arriving afterwards are ignored.
    pub fn detach(&self) {
        let inner = &self.inner;
        inner.release_hover();
        let editor = std::mem::take(&mut *inner.editor.borrow_mut()).upgrade();
        if let (Some(editor), Some(id)) = (editor, inner.subscription.take()) {
            editor.events().unsubscribe(id);
            log::debug!("pending connection detached");
        }

        inner.next_session();
        let changes = Changes {
            visible: inner.is_visible.store(false),
            preview: inner.preview_target.store(None),
            source: inner.source.store(None),
            target: inner.target.store(None),
            anchors: false,
        };
        inner.notify(&changes);
    }

    pub fn is_attached(&self) -> bool {
        self.inner.subscription.get().is_some() && self.inner.editor().is_some()
    }

    // === Event handling ===

    /// Feed one lifecycle event. Called by the editor subscription; public so a
    /// host can also drive the controller directly.
    pub fn handle_event(&self, event: &PendingConnectionEvent) {
        match event {
            PendingConnectionEvent::Started(args) => self.on_started(args),
            PendingConnectionEvent::Drag(args) => self.on_drag(args),
            PendingConnectionEvent::Completed(args) => self.on_completed(args),
        }
    }

    fn on_started(&self, args: &PendingConnectionEventArgs) {
        let inner = &self.inner;
        if inner.is_visible.get() {
            log::debug!("pending connection restarted while active; resetting session");
            inner.release_hover();
        }

        inner.next_session();
        let changes = Changes {
            preview: inner.preview_target.store(None),
            target: inner.target.store(None),
            source: inner.source.store(args.source_connector),
            anchors: inner.store_anchors(args.anchor, args.pointer()),
            visible: inner.is_visible.store(true),
        };
        log::debug!(
            "pending connection started from {:?} at {:?}",
            args.source_connector,
            args.anchor
        );
        inner.notify(&changes);
    }

    fn on_drag(&self, args: &PendingConnectionEventArgs) {
        let inner = &self.inner;
        if !inner.is_visible.get() {
            log::trace!("ignoring drag while idle");
            return;
        }

        let mut changes = Changes::default();
        let mut target_anchor = args.pointer();
        let preview = inner.enable_preview.get();
        let snapping = inner.enable_snapping.get();

        if let Some(editor) = inner.editor().filter(|_| preview || snapping) {
            let candidate = editor.element_under_pointer(inner.allow_only_connectors.get());

            if snapping {
                if let Some(id) = candidate.filter(|&id| editor.tree().kind(id) == Some(ElementKind::Connector)) {
                    let anchor = editor.tree_mut().update_anchor(id);
                    if let Ok(anchor) = anchor {
                        target_anchor = anchor;
                    }
                }
            }

            if candidate != inner.hovered.get() {
                log::trace!("pending connection candidate {:?} -> {:?}", inner.hovered.get(), candidate);
                if let Some(prev) = inner.hovered.get() {
                    editor.set_is_over_element(prev, false);
                }
                if let Some(id) = candidate {
                    editor.set_is_over_element(id, true);
                    if preview {
                        let context = editor.tree().context(id).cloned();
                        changes.preview = inner.preview_target.store(context);
                    }
                }
                inner.hovered.set(candidate);
            }
        }

        changes.anchors = inner.target_anchor.replace(target_anchor) != target_anchor;
        inner.notify(&changes);
    }

    fn on_completed(&self, args: &PendingConnectionEventArgs) {
        let inner = &self.inner;
        if !inner.is_visible.get() {
            log::trace!("ignoring completion while idle");
            return;
        }

        let source = inner.source.get();
        let target = args.target_connector;
        inner.release_hover();
        inner.next_session();
        let changes = Changes {
            target: inner.target.store(target),
            preview: inner.preview_target.store(None),
            visible: inner.is_visible.store(false),
            ..Changes::default()
        };
        log::debug!("pending connection completed: {:?} -> {:?}", source, target);

        if !inner.notify(&changes) {
            log::debug!("pending connection torn down while completing; not reporting {:?} -> {:?}", source, target);
            return;
        }
        let handlers: Vec<CompletedHandler> = inner.completed_handlers.borrow().clone();
        for handler in handlers {
            handler(source, target);
        }
    }

    // === Observable state ===

    pub fn source(&self) -> Option<ElementId> {
        self.inner.source.get()
    }

    /// Where the last gesture was released. `None` means "no connection".
    pub fn target(&self) -> Option<ElementId> {
        self.inner.target.get()
    }

    /// Context data of the hovered candidate, when preview is enabled.
    pub fn preview_target(&self) -> Option<D> {
        self.inner.preview_target.get()
    }

    pub fn source_anchor(&self) -> Point {
        self.inner.source_anchor.get()
    }

    pub fn target_anchor(&self) -> Point {
        self.inner.target_anchor.get()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.is_visible.get()
    }

    /// True between `Started` and `Completed`; same as [`is_visible`](Self::is_visible).
    pub fn is_active(&self) -> bool {
        self.is_visible()
    }

    /// The element this session flagged as hovered, unless it has since been
    /// removed from the editor.
    pub fn hovered_element(&self) -> Option<ElementId> {
        let hovered = self.inner.hovered.get()?;
        match self.inner.editor() {
            Some(editor) if !editor.tree().contains(hovered) => None,
            _ => Some(hovered),
        }
    }

    pub fn on_visible_changed(&self, f: impl Fn(bool) + 'static) {
        self.inner.is_visible.on_changed(move |v| f(*v));
    }

    /// Called with `(source_anchor, target_anchor)` once per event that moved either.
    pub fn on_anchors_changed(&self, f: impl Fn(Point, Point) + 'static) {
        self.inner.anchor_listeners.borrow_mut().push(Rc::new(f));
    }

    pub fn on_preview_target_changed(&self, f: impl Fn(Option<&D>) + 'static) {
        self.inner.preview_target.on_changed(move |v| f(v.as_ref()));
    }

    /// Called after every processed `Completed` with `(source, target)`.
    /// Validating and creating the link is up to the application.
    pub fn on_connection_completed(&self, f: impl Fn(Option<ElementId>, Option<ElementId>) + 'static) {
        self.inner.completed_handlers.borrow_mut().push(Rc::new(f));
    }

    // === Configuration ===

    pub fn config(&self) -> PendingConnectionConfig {
        PendingConnectionConfig {
            enable_preview: self.inner.enable_preview.get(),
            enable_snapping: self.inner.enable_snapping.get(),
            allow_only_connectors: self.inner.allow_only_connectors.get(),
            stroke_thickness: self.inner.stroke_thickness.get(),
            stroke_dash_array: self.inner.stroke_dash_array.get(),
        }
    }

    /// Apply a whole configuration. Nothing changes if it is invalid.
    pub fn apply_config(&self, config: PendingConnectionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.set_enable_preview(config.enable_preview);
        self.set_enable_snapping(config.enable_snapping);
        self.set_allow_only_connectors(config.allow_only_connectors);
        self.inner.stroke_thickness.set(config.stroke_thickness);
        self.inner.stroke_dash_array.set(config.stroke_dash_array);
        Ok(())
    }

    pub fn enable_preview(&self) -> bool {
        self.inner.enable_preview.get()
    }

    pub fn set_enable_preview(&self, enabled: bool) {
        self.inner.enable_preview.set(enabled);
    }

    pub fn enable_snapping(&self) -> bool {
        self.inner.enable_snapping.get()
    }

    pub fn set_enable_snapping(&self, enabled: bool) {
        self.inner.enable_snapping.set(enabled);
    }

    pub fn allow_only_connectors(&self) -> bool {
        self.inner.allow_only_connectors.get()
    }

    /// Also updates the attached editor's shared flag, so connectors resolving a
    /// release target use the same restriction.
    pub fn set_allow_only_connectors(&self, only_connectors: bool) {
        if self.inner.allow_only_connectors.replace(only_connectors) == only_connectors {
            return;
        }
        if let Some(editor) = self.inner.editor() {
            editor.set_allow_only_connectors(only_connectors);
        }
    }

    pub fn stroke_thickness(&self) -> f32 {
        self.inner.stroke_thickness.get()
    }

    pub fn set_stroke_thickness(&self, thickness: f32) -> Result<(), ConfigError> {
        validate_stroke_thickness(thickness)?;
        self.inner.stroke_thickness.set(thickness);
        Ok(())
    }

    pub fn stroke_dash_array(&self) -> Vec<f32> {
        self.inner.stroke_dash_array.get()
    }

    pub fn set_stroke_dash_array(&self, dashes: Vec<f32>) -> Result<(), ConfigError> {
        validate_dash_array(&dashes)?;
        self.inner.stroke_dash_array.set(dashes);
        Ok(())
    }

    /// Set the bezier curve offset for the pending path (default: 50.0).
    pub fn set_bezier_offset(&self, offset: f32) {
        self.inner.bezier_offset.set(offset);
    }

    // === Rendering bridge ===

    /// SVG path of the pending link, empty while idle.
    pub fn pending_path(&self) -> SharedString {
        if !self.is_visible() {
            return SharedString::default();
        }
        generate_bezier_path(
            self.source_anchor(),
            self.target_anchor(),
            1.0,
            self.inner.bezier_offset.get(),
        )
        .into()
    }

    /// Returns a callback for a `compute-pending-path()` Slint callback.
    pub fn pending_path_callback(&self) -> impl Fn() -> SharedString {
        let this = self.clone();
        move || this.pending_path()
    }

    /// Dash pattern as a Slint model.
    pub fn stroke_dash_array_model(&self) -> ModelRc<f32> {
        ModelRc::new(VecModel::from(self.stroke_dash_array()))
    }
}
