//! Test harness: an editor with two nodes, four connectors and a free element.
//!
//! Layout (editor space):
//!
//! - items host panel covering (0, 0) 1000x1000, transparent to hits
//! - Node A at (100, 100), 150x100, with a title label; input anchor (100, 150),
//!   output anchor (250, 150)
//! - Node B at (400, 200), 150x100; input anchor (400, 250), output anchor (550, 250)
//! - a comment element at (700, 500), 100x60, not part of any node

#![allow(dead_code)]

use super::Recorder;
use slint::SharedString;
use slint_pending_connection::{
    ConnectorDrag, ElementId, ElementKind, NodeEditor, PendingConnection, PendingConnectionConfig,
    PendingConnectionEvent, PendingConnectionEventArgs, Point, Rect,
};
use std::rc::Rc;

pub const PIN_SIZE: f32 = 12.0;

pub struct EditorHarness {
    pub editor: Rc<NodeEditor<SharedString>>,
    pub pending: PendingConnection<SharedString>,
    pub drag: ConnectorDrag<SharedString>,
    pub recorder: Recorder,
    pub host: ElementId,
    pub node_a: ElementId,
    pub title_a: ElementId,
    pub a_in: ElementId,
    pub a_out: ElementId,
    pub node_b: ElementId,
    pub b_in: ElementId,
    pub b_out: ElementId,
    pub comment: ElementId,
}

impl EditorHarness {
    /// Harness with the default configuration (no preview, no snapping, connectors only).
    pub fn new() -> Self {
        Self::with_config(PendingConnectionConfig::default())
    }

    pub fn with_config(config: PendingConnectionConfig) -> Self {
        let editor = Rc::new(NodeEditor::new());
        let root = editor.root();

        let host = editor
            .add_element(root, ElementKind::Element, Rect::new(0.0, 0.0, 1000.0, 1000.0))
            .unwrap();
        editor.tree_mut().set_hit_test_visible(host, false).unwrap();
        editor.set_items_host(Some(host)).unwrap();

        let (node_a, a_in, a_out) = add_node(&editor, host, "A", 100.0, 100.0);
        let title_a = editor
            .add_element(node_a, ElementKind::Element, Rect::new(0.0, 0.0, 150.0, 24.0))
            .unwrap();
        editor.tree_mut().set_context(title_a, "A.title".into()).unwrap();
        let (node_b, b_in, b_out) = add_node(&editor, host, "B", 400.0, 200.0);

        let comment = editor
            .add_element(host, ElementKind::Element, Rect::new(700.0, 500.0, 100.0, 60.0))
            .unwrap();
        editor.tree_mut().set_context(comment, "comment".into()).unwrap();

        let pending = PendingConnection::new(config);
        pending.attach(&editor);
        let recorder = Recorder::new();
        recorder.observe(&pending);
        let drag = ConnectorDrag::new(editor.clone());

        Self {
            editor,
            pending,
            drag,
            recorder,
            host,
            node_a,
            title_a,
            a_in,
            a_out,
            node_b,
            b_in,
            b_out,
            comment,
        }
    }

    /// Raise `Started` from A's output as if pressed at `anchor + offset`.
    pub fn start(&self, anchor: Point, offset_x: f32, offset_y: f32) {
        self.editor.set_pointer_position(anchor.offset(offset_x, offset_y));
        self.editor.raise(PendingConnectionEvent::Started(
            PendingConnectionEventArgs::new(anchor)
                .with_offset(offset_x, offset_y)
                .with_source(self.a_out),
        ));
    }

    /// Raise `Drag` with explicit anchor and offset; the pointer is moved to their sum.
    pub fn drag_raw(&self, anchor: Point, offset_x: f32, offset_y: f32) {
        self.editor.set_pointer_position(anchor.offset(offset_x, offset_y));
        self.editor.raise(PendingConnectionEvent::Drag(
            PendingConnectionEventArgs::new(anchor)
                .with_offset(offset_x, offset_y)
                .with_source(self.a_out),
        ));
    }

    /// Raise `Drag` relative to the current source anchor so the pointer lands on `pointer`.
    pub fn drag_to(&self, pointer: Point) {
        let anchor = self.pending.source_anchor();
        let delta = pointer - anchor;
        self.drag_raw(anchor, delta.x, delta.y);
    }

    pub fn complete(&self, target: Option<ElementId>) {
        self.editor.raise(PendingConnectionEvent::Completed(
            PendingConnectionEventArgs::new(self.pending.source_anchor())
                .with_source(self.a_out)
                .with_target(target),
        ));
    }

    pub fn anchor_of(&self, connector: ElementId) -> Point {
        self.editor.tree().anchor(connector).unwrap()
    }

    /// Number of elements carrying the hover flag.
    pub fn hovered_count(&self) -> usize {
        self.editor.over_elements().len()
    }
}

/// Add a 150x100 node container with an input pin on the left edge and an output
/// pin on the right edge, both vertically centered.
fn add_node(
    editor: &NodeEditor<SharedString>,
    parent: ElementId,
    name: &str,
    x: f32,
    y: f32,
) -> (ElementId, ElementId, ElementId) {
    let half = PIN_SIZE / 2.0;
    let node = editor
        .add_element(parent, ElementKind::ItemContainer, Rect::new(x, y, 150.0, 100.0))
        .unwrap();
    let input = editor
        .add_element(node, ElementKind::Connector, Rect::new(-half, 50.0 - half, PIN_SIZE, PIN_SIZE))
        .unwrap();
    let output = editor
        .add_element(node, ElementKind::Connector, Rect::new(150.0 - half, 50.0 - half, PIN_SIZE, PIN_SIZE))
        .unwrap();

    let mut tree = editor.tree_mut();
    tree.set_context(node, format!("Node {}", name).into()).unwrap();
    tree.set_context(input, format!("{}.in", name).into()).unwrap();
    tree.set_context(output, format!("{}.out", name).into()).unwrap();
    (node, input, output)
}
