//! The editor-side collaborator a pending connection plugs into.
//!
//! [`NodeEditor`] owns the element tree, the current pointer position, the
//! lifecycle [`EventChannel`], and two side tables that do not belong to the
//! elements themselves:
//!
//! - the per-element *is-over* flag used for hover styling during a drag
//! - the per-editor *allow only connectors* flag, shared by every control that
//!   resolves connection targets in this editor
//!
//! Share it as `Rc<NodeEditor<D>>`; all state uses interior mutability and is
//! only touched from the UI thread.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashSet;

use crate::error::TreeError;
use crate::events::{EventChannel, PendingConnectionEvent};
use crate::geometry::{Point, Rect};
use crate::hit_test::find_potential_connector;
use crate::tree::{ElementId, ElementKind, ElementTree};

#[derive(Debug)]
pub struct NodeEditor<D = ()> {
    tree: RefCell<ElementTree<D>>,
    items_host: Cell<Option<ElementId>>,
    pointer: Cell<Point>,
    channel: EventChannel,
    over_elements: RefCell<HashSet<ElementId>>,
    allow_only_connectors: Cell<bool>,
}

impl<D> Default for NodeEditor<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> NodeEditor<D> {
    pub fn new() -> Self {
        Self::with_tree(ElementTree::new())
    }

    pub fn with_tree(tree: ElementTree<D>) -> Self {
        Self {
            tree: RefCell::new(tree),
            items_host: Cell::new(None),
            pointer: Cell::new(Point::ZERO),
            channel: EventChannel::new(),
            over_elements: RefCell::new(HashSet::new()),
            allow_only_connectors: Cell::new(true),
        }
    }

    // === Element tree ===

    pub fn tree(&self) -> Ref<'_, ElementTree<D>> {
        self.tree.borrow()
    }

    /// Mutable access for layout updates. Do not hold across event dispatch.
    pub fn tree_mut(&self) -> RefMut<'_, ElementTree<D>> {
        self.tree.borrow_mut()
    }

    pub fn root(&self) -> ElementId {
        self.tree.borrow().root()
    }

    pub fn add_element(&self, parent: ElementId, kind: ElementKind, bounds: Rect) -> Result<ElementId, TreeError> {
        self.tree.borrow_mut().add(parent, kind, bounds)
    }

    /// Remove an element subtree, dropping any hover flags it carried.
    pub fn remove_element(&self, id: ElementId) -> Result<Vec<ElementId>, TreeError> {
        let removed = self.tree.borrow_mut().remove(id)?;
        let mut over = self.over_elements.borrow_mut();
        for id in &removed {
            over.remove(id);
        }
        if self.items_host.get().is_some_and(|host| removed.contains(&host)) {
            self.items_host.set(None);
        }
        Ok(removed)
    }

    /// The panel that hosts the node containers. Hit testing searches below it when set.
    pub fn items_host(&self) -> Option<ElementId> {
        self.items_host.get()
    }

    pub fn set_items_host(&self, host: Option<ElementId>) -> Result<(), TreeError> {
        if let Some(id) = host {
            if !self.tree.borrow().contains(id) {
                return Err(TreeError::UnknownElement(id));
            }
        }
        self.items_host.set(host);
        Ok(())
    }

    /// Root of connection hit testing: the items host if present, else the editor root.
    pub fn search_root(&self) -> ElementId {
        self.items_host.get().unwrap_or_else(|| self.root())
    }

    // === Pointer ===

    pub fn pointer_position(&self) -> Point {
        self.pointer.get()
    }

    pub fn set_pointer_position(&self, position: Point) {
        self.pointer.set(position);
    }

    /// Best connection candidate under the current pointer position.
    pub fn element_under_pointer(&self, allow_only_connectors: bool) -> Option<ElementId> {
        find_potential_connector(
            &*self.tree.borrow(),
            self.search_root(),
            self.pointer.get(),
            allow_only_connectors,
        )
    }

    // === Events ===

    pub fn events(&self) -> &EventChannel {
        &self.channel
    }

    pub fn raise(&self, event: PendingConnectionEvent) {
        log::trace!("raising pending connection {} event: {:?}", event.name(), event.args());
        self.channel.publish(event);
    }

    // === Side tables ===

    pub fn is_over_element(&self, id: ElementId) -> bool {
        self.over_elements.borrow().contains(&id)
    }

    /// Set or clear the hover flag of an element. Unknown elements are never flagged.
    pub fn set_is_over_element(&self, id: ElementId, value: bool) {
        if value {
            if self.tree.borrow().contains(id) {
                self.over_elements.borrow_mut().insert(id);
            } else {
                log::debug!("ignoring hover flag for unknown element {:?}", id);
            }
        } else {
            self.over_elements.borrow_mut().remove(&id);
        }
    }

    /// Every element currently flagged as hovered, sorted by id.
    pub fn over_elements(&self) -> Vec<ElementId> {
        let mut ids: Vec<_> = self.over_elements.borrow().iter().copied().collect();
        ids.sort();
        ids
    }

    /// Restriction shared by every control resolving targets in this editor.
    pub fn allow_only_connectors(&self) -> bool {
        self.allow_only_connectors.get()
    }

    pub fn set_allow_only_connectors(&self, value: bool) {
        if self.allow_only_connectors.replace(value) != value {
            log::debug!("editor allow-only-connectors set to {}", value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with_node() -> (NodeEditor, ElementId, ElementId) {
        let editor = NodeEditor::new();
        let node = editor
            .add_element(editor.root(), ElementKind::ItemContainer, Rect::new(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let pin = editor
            .add_element(node, ElementKind::Connector, Rect::new(94.0, 44.0, 12.0, 12.0))
            .unwrap();
        (editor, node, pin)
    }

    #[test]
    fn test_hover_flag_side_table() {
        let (editor, node, pin) = editor_with_node();
        editor.set_is_over_element(pin, true);
        assert!(editor.is_over_element(pin));
        assert!(!editor.is_over_element(node));

        editor.set_is_over_element(pin, false);
        assert!(editor.over_elements().is_empty());

        editor.set_is_over_element(ElementId(42), true);
        assert!(!editor.is_over_element(ElementId(42)));
    }

    #[test]
    fn test_remove_clears_hover_flags() {
        let (editor, node, pin) = editor_with_node();
        editor.set_is_over_element(pin, true);
        editor.remove_element(node).unwrap();
        assert!(!editor.is_over_element(pin));
    }

    #[test]
    fn test_search_root_prefers_items_host() {
        let (editor, node, _) = editor_with_node();
        assert_eq!(editor.search_root(), editor.root());

        editor.set_items_host(Some(node)).unwrap();
        assert_eq!(editor.search_root(), node);

        assert_eq!(
            editor.set_items_host(Some(ElementId(99))),
            Err(TreeError::UnknownElement(ElementId(99)))
        );

        editor.remove_element(node).unwrap();
        assert_eq!(editor.items_host(), None);
    }

    #[test]
    fn test_element_under_pointer_uses_current_position() {
        let (editor, node, pin) = editor_with_node();
        editor.set_pointer_position(Point::new(100.0, 50.0));
        assert_eq!(editor.element_under_pointer(true), Some(pin));

        editor.set_pointer_position(Point::new(20.0, 20.0));
        assert_eq!(editor.element_under_pointer(true), None);
        assert_eq!(editor.element_under_pointer(false), Some(node));
    }

    #[test]
    fn test_allow_only_connectors_defaults_to_true() {
        let editor: NodeEditor = NodeEditor::new();
        assert!(editor.allow_only_connectors());
        editor.set_allow_only_connectors(false);
        assert!(!editor.allow_only_connectors());
    }
}
