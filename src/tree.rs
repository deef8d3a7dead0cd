//! Element tree: the slice of the editor's visual tree that hit testing needs.
//!
//! Elements are stored in an arena keyed by [`ElementId`]. Bounds are relative
//! to the parent's origin, so moving a node container moves every connector it
//! hosts. Connector anchors are cached in absolute editor space and only
//! refreshed by [`ElementTree::update_anchor`], mirroring how a UI framework
//! reports pin positions after layout rather than on every frame.

use std::collections::HashMap;

use crate::error::TreeError;
use crate::geometry::{Point, Rect};

/// Identity of an element in an [`ElementTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// What role an element plays for connection hit testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A connection endpoint (pin). Has an anchor.
    Connector,
    /// The container of one diagram node.
    ItemContainer,
    /// Anything else: node content, labels, decorations.
    Element,
}

#[derive(Debug)]
struct ElementData<D> {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    bounds: Rect,
    z_index: i32,
    hit_test_visible: bool,
    context: Option<D>,
    anchor: Point,
}

/// Arena-backed tree of elements, generic over the per-element context data `D`
/// (the "data context" an application binds to each node or pin).
#[derive(Debug)]
pub struct ElementTree<D = ()> {
    elements: HashMap<ElementId, ElementData<D>>,
    root: ElementId,
    next_id: u32,
}

impl<D> Default for ElementTree<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> ElementTree<D> {
    /// Create a tree holding only a root element at the origin.
    pub fn new() -> Self {
        let root = ElementId(0);
        let mut elements = HashMap::new();
        elements.insert(
            root,
            ElementData {
                kind: ElementKind::Element,
                parent: None,
                children: Vec::new(),
                bounds: Rect::default(),
                z_index: 0,
                hit_test_visible: true,
                context: None,
                anchor: Point::ZERO,
            },
        );
        Self { elements, root, next_id: 1 }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if only the root is left.
    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Add an element under `parent` with bounds relative to the parent's origin.
    pub fn add(&mut self, parent: ElementId, kind: ElementKind, bounds: Rect) -> Result<ElementId, TreeError> {
        let parent_data = self
            .elements
            .get_mut(&parent)
            .ok_or(TreeError::UnknownElement(parent))?;
        let id = ElementId(self.next_id);
        self.next_id += 1;
        parent_data.children.push(id);

        self.elements.insert(
            id,
            ElementData {
                kind,
                parent: Some(parent),
                children: Vec::new(),
                bounds,
                z_index: 0,
                hit_test_visible: true,
                context: None,
                anchor: Point::ZERO,
            },
        );
        if kind == ElementKind::Connector {
            self.update_anchor(id)?;
        }
        Ok(id)
    }

    /// Remove an element and its whole subtree. Returns every removed id.
    pub fn remove(&mut self, id: ElementId) -> Result<Vec<ElementId>, TreeError> {
        if id == self.root {
            return Err(TreeError::CannotRemoveRoot);
        }
        let parent = self
            .elements
            .get(&id)
            .ok_or(TreeError::UnknownElement(id))?
            .parent;
        if let Some(parent) = parent.and_then(|p| self.elements.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.elements.remove(&current) {
                stack.extend(data.children);
                removed.push(current);
            }
        }
        Ok(removed)
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.elements.get(&id).map(|e| e.kind)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// True if `id` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Bounds relative to the parent's origin.
    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(&id).map(|e| e.bounds)
    }

    /// Bounds in editor space (parent origins accumulated up to the root).
    pub fn absolute_bounds(&self, id: ElementId) -> Option<Rect> {
        let data = self.elements.get(&id)?;
        let mut rect = data.bounds;
        let mut current = data.parent;
        while let Some(p) = current {
            let parent = self.elements.get(&p)?;
            rect = rect.translated(parent.bounds.origin());
            current = parent.parent;
        }
        Some(rect)
    }

    /// Move or resize an element. Cached anchors below it go stale until
    /// [`update_anchor`](Self::update_anchor) is called.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> Result<(), TreeError> {
        self.data_mut(id)?.bounds = bounds;
        Ok(())
    }

    /// Siblings with a higher z-index paint above lower ones; ties keep insertion order.
    pub fn set_z_index(&mut self, id: ElementId, z_index: i32) -> Result<(), TreeError> {
        self.data_mut(id)?.z_index = z_index;
        Ok(())
    }

    pub fn z_index(&self, id: ElementId) -> Option<i32> {
        self.elements.get(&id).map(|e| e.z_index)
    }

    /// Elements that are not hit-test visible are skipped, but their children are still tested.
    pub fn set_hit_test_visible(&mut self, id: ElementId, visible: bool) -> Result<(), TreeError> {
        self.data_mut(id)?.hit_test_visible = visible;
        Ok(())
    }

    pub fn is_hit_test_visible(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(|e| e.hit_test_visible)
    }

    pub fn set_context(&mut self, id: ElementId, context: D) -> Result<(), TreeError> {
        self.data_mut(id)?.context = Some(context);
        Ok(())
    }

    pub fn context(&self, id: ElementId) -> Option<&D> {
        self.elements.get(&id).and_then(|e| e.context.as_ref())
    }

    /// Last computed anchor of a connector. May be stale after layout changes.
    pub fn anchor(&self, id: ElementId) -> Option<Point> {
        self.elements
            .get(&id)
            .filter(|e| e.kind == ElementKind::Connector)
            .map(|e| e.anchor)
    }

    /// Recompute a connector's anchor (center of its absolute bounds) and cache it.
    pub fn update_anchor(&mut self, id: ElementId) -> Result<Point, TreeError> {
        match self.kind(id) {
            None => return Err(TreeError::UnknownElement(id)),
            Some(ElementKind::Connector) => {}
            Some(_) => return Err(TreeError::NotAConnector(id)),
        }
        let anchor = self
            .absolute_bounds(id)
            .ok_or(TreeError::UnknownElement(id))?
            .center();
        self.data_mut(id)?.anchor = anchor;
        Ok(anchor)
    }

    /// Descendants of `root` in paint order: pre-order, children above their
    /// parent, siblings sorted by z-index (stable, so insertion order breaks ties).
    /// The last entry is the topmost element. `root` itself is not included.
    pub fn paint_order(&self, root: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        self.collect_paint_order(root, &mut order);
        order
    }

    fn collect_paint_order(&self, id: ElementId, out: &mut Vec<ElementId>) {
        let Some(data) = self.elements.get(&id) else {
            return;
        };
        let mut children = data.children.clone();
        children.sort_by_key(|c| self.z_index(*c).unwrap_or(0));
        for child in children {
            out.push(child);
            self.collect_paint_order(child, out);
        }
    }

    fn data_mut(&mut self, id: ElementId) -> Result<&mut ElementData<D>, TreeError> {
        self.elements.get_mut(&id).ok_or(TreeError::UnknownElement(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_bounds_accumulate_parent_origins() {
        let mut tree: ElementTree = ElementTree::new();
        let node = tree
            .add(tree.root(), ElementKind::ItemContainer, Rect::new(100.0, 100.0, 150.0, 100.0))
            .unwrap();
        let pin = tree
            .add(node, ElementKind::Connector, Rect::new(144.0, 44.0, 12.0, 12.0))
            .unwrap();

        assert_eq!(tree.absolute_bounds(pin), Some(Rect::new(244.0, 144.0, 12.0, 12.0)));
        assert_eq!(tree.anchor(pin), Some(Point::new(250.0, 150.0)));
    }

    #[test]
    fn test_anchor_is_stale_until_updated() {
        let mut tree: ElementTree = ElementTree::new();
        let node = tree
            .add(tree.root(), ElementKind::ItemContainer, Rect::new(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let pin = tree
            .add(node, ElementKind::Connector, Rect::new(0.0, 44.0, 12.0, 12.0))
            .unwrap();
        assert_eq!(tree.anchor(pin), Some(Point::new(6.0, 50.0)));

        tree.set_bounds(node, Rect::new(50.0, 10.0, 100.0, 100.0)).unwrap();
        assert_eq!(tree.anchor(pin), Some(Point::new(6.0, 50.0)));

        assert_eq!(tree.update_anchor(pin), Ok(Point::new(56.0, 60.0)));
        assert_eq!(tree.anchor(pin), Some(Point::new(56.0, 60.0)));
    }

    #[test]
    fn test_update_anchor_rejects_non_connectors() {
        let mut tree: ElementTree = ElementTree::new();
        let node = tree
            .add(tree.root(), ElementKind::ItemContainer, Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        assert_eq!(tree.update_anchor(node), Err(TreeError::NotAConnector(node)));
        assert_eq!(tree.update_anchor(ElementId(99)), Err(TreeError::UnknownElement(ElementId(99))));
        assert_eq!(tree.anchor(node), None);
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree: ElementTree<&str> = ElementTree::new();
        let node = tree
            .add(tree.root(), ElementKind::ItemContainer, Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        let pin = tree.add(node, ElementKind::Connector, Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();

        let mut removed = tree.remove(node).unwrap();
        removed.sort();
        assert_eq!(removed, vec![node, pin]);
        assert!(!tree.contains(pin));
        assert!(tree.children(tree.root()).is_empty());
        assert!(tree.is_empty());
        assert_eq!(tree.remove(tree.root()), Err(TreeError::CannotRemoveRoot));
    }

    #[test]
    fn test_paint_order_respects_z_index() {
        let mut tree: ElementTree = ElementTree::new();
        let a = tree.add(tree.root(), ElementKind::ItemContainer, Rect::default()).unwrap();
        let a_child = tree.add(a, ElementKind::Element, Rect::default()).unwrap();
        let b = tree.add(tree.root(), ElementKind::ItemContainer, Rect::default()).unwrap();

        assert_eq!(tree.paint_order(tree.root()), vec![a, a_child, b]);

        tree.set_z_index(a, 1).unwrap();
        assert_eq!(tree.paint_order(tree.root()), vec![b, a, a_child]);
    }

    #[test]
    fn test_context_and_descendants() {
        let mut tree: ElementTree<String> = ElementTree::new();
        let node = tree.add(tree.root(), ElementKind::ItemContainer, Rect::default()).unwrap();
        let pin = tree.add(node, ElementKind::Connector, Rect::default()).unwrap();
        tree.set_context(pin, "out".to_string()).unwrap();

        assert_eq!(tree.context(pin).map(String::as_str), Some("out"));
        assert_eq!(tree.context(node), None);
        assert!(tree.is_descendant_of(pin, tree.root()));
        assert!(tree.is_descendant_of(pin, node));
        assert!(!tree.is_descendant_of(node, pin));
        assert!(!tree.is_descendant_of(node, node));
    }
}
