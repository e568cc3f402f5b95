use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::instrument;

use crate::domain::error::{DomError, DomResult};
use crate::domain::widget::{Widget, WidgetKind};

/// Stable handle to a node in a [`DomArena`].
///
/// Handles are generational: once a node is removed its handle never
/// resolves again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "node-{}.{}", slot, generation)
    }
}

/// Data payload for mounted nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: WidgetKind,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub label: Option<String>,
    pub can_focus: bool,
    pub disabled: bool,
}

impl NodeData {
    fn screen() -> Self {
        Self {
            kind: WidgetKind::Screen,
            id: None,
            classes: Vec::new(),
            label: None,
            can_focus: false,
            disabled: false,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }
        if !self.classes.is_empty() {
            write!(f, ".{}", self.classes.iter().join("."))?;
        }
        if let Some(label) = &self.label {
            write!(f, " {:?}", label)?;
        }
        if self.disabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// None only for the screen
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed widget tree rooted at a screen node.
///
/// Nodes reference each other by [`NodeId`] rather than by ownership, so a
/// subtree can be detached and disposed without walking owned pointers.
#[derive(Debug)]
pub struct DomArena {
    arena: Arena<TreeNode>,
    screen: NodeId,
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

impl DomArena {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let screen = NodeId(arena.insert(TreeNode {
            data: NodeData::screen(),
            parent: None,
            children: Vec::new(),
        }));
        Self { arena, screen }
    }

    pub fn screen(&self) -> NodeId {
        self.screen
    }

    /// Number of live nodes, screen included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when only the screen remains.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id.0)
    }

    pub(crate) fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.arena.get_mut(id.0)
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.get_node(id).map(|node| &node.data)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|node| node.parent)
    }

    /// Children of `id` in mount order; empty for stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Mounts `widget` and its subtree as the last child of `parent`.
    ///
    /// Nothing is inserted when the blueprint contains a `Screen`.
    #[instrument(level = "trace", skip(self, widget), fields(kind = %widget.kind))]
    pub fn insert_widget(&mut self, parent: NodeId, widget: Widget) -> DomResult<NodeId> {
        if !self.contains(parent) {
            return Err(DomError::NodeNotFound(parent));
        }
        if widget.contains_kind(&WidgetKind::Screen) {
            return Err(DomError::CannotMountScreen);
        }

        let mut stack = vec![(widget, parent)];
        let mut root = None;
        // Children are pushed in reverse so siblings are appended in order.
        while let Some((widget, parent_id)) = stack.pop() {
            let Widget {
                kind,
                id,
                classes,
                label,
                can_focus,
                disabled,
                children,
            } = widget;
            let node_id = NodeId(self.arena.insert(TreeNode {
                data: NodeData {
                    kind,
                    id,
                    classes,
                    label,
                    can_focus,
                    disabled,
                },
                parent: Some(parent_id),
                children: Vec::new(),
            }));
            if let Some(parent) = self.get_node_mut(parent_id) {
                parent.children.push(node_id);
            }
            root.get_or_insert(node_id);
            for child in children.into_iter().rev() {
                stack.push((child, node_id));
            }
        }

        root.ok_or(DomError::NodeNotFound(parent))
    }

    /// Unlinks each of `ids` from its parent's children, one pass per parent.
    /// The subtrees stay in the arena.
    pub(crate) fn detach_many(&mut self, ids: &[NodeId]) {
        let targets: HashSet<NodeId> = ids.iter().copied().collect();
        let parents: Vec<NodeId> = ids.iter().filter_map(|&id| self.parent(id)).unique().collect();
        for parent_id in parents {
            if let Some(parent) = self.get_node_mut(parent_id) {
                parent.children.retain(|child| !targets.contains(child));
            }
        }
        for &id in ids {
            if let Some(node) = self.get_node_mut(id) {
                node.parent = None;
            }
        }
    }

    /// Drops a single node from the arena, returning its data.
    pub(crate) fn dispose(&mut self, id: NodeId) -> Option<NodeData> {
        self.arena.remove(id.0).map(|node| node.data)
    }

    /// Ancestors of `id`, nearest first, up to and including the screen.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.parent(id),
        }
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Pre-order traversal of the subtree under `id`.
    #[instrument(level = "trace", skip(self))]
    pub fn walk_children(&self, id: NodeId, with_self: bool) -> WalkChildren<'_> {
        WalkChildren::new(self, id, with_self)
    }

    /// Post-order traversal of the subtree under `id`, `id` last.
    #[instrument(level = "trace", skip(self))]
    pub fn walk_postorder(&self, id: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, id)
    }

    /// Number of levels, the screen counting as one.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.screen, 1)];
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(self.children(id).iter().map(|&child| (child, level + 1)));
        }
        deepest
    }
}

pub struct Ancestors<'a> {
    arena: &'a DomArena,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.parent(current);
        Some(current)
    }
}

/// Lazy depth-first walk; consumed once.
pub struct WalkChildren<'a> {
    arena: &'a DomArena,
    stack: Vec<NodeId>,
}

impl<'a> WalkChildren<'a> {
    fn new(arena: &'a DomArena, start: NodeId, with_self: bool) -> Self {
        let mut stack = Vec::new();
        if with_self {
            if arena.contains(start) {
                stack.push(start);
            }
        } else {
            stack.extend(arena.children(start).iter().rev());
        }
        Self { arena, stack }
    }
}

impl Iterator for WalkChildren<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack
            .extend(self.arena.children(current).iter().rev().copied());
        Some(current)
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a DomArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a DomArena, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if arena.contains(start) {
            stack.push((start, false));
        }
        Self { arena, stack }
    }
}

impl Iterator for PostOrderIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            for &child in self.arena.children(current).iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(depth: usize) -> Widget {
        (0..depth).fold(Widget::text("leaf"), |inner, _| Widget::container([inner]))
    }

    #[test]
    fn given_nested_widget_when_inserting_then_children_keep_mount_order() {
        let mut dom = DomArena::new();
        let root = dom
            .insert_widget(
                dom.screen(),
                Widget::container([
                    Widget::button("a"),
                    Widget::button("b"),
                    Widget::button("c"),
                ]),
            )
            .unwrap();

        let labels: Vec<_> = dom
            .children(root)
            .iter()
            .filter_map(|&id| dom.data(id).and_then(|d| d.label.clone()))
            .collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert_eq!(dom.parent(root), Some(dom.screen()));
    }

    #[test]
    fn given_branch_when_walking_then_preorder_and_postorder_agree_on_size() {
        let mut dom = DomArena::new();
        let root = dom.insert_widget(dom.screen(), branch(5)).unwrap();

        let pre: Vec<_> = dom.walk_children(root, true).collect();
        let post: Vec<_> = dom.walk_postorder(root).collect();
        assert_eq!(pre.len(), 6);
        assert_eq!(post.len(), 6);
        assert_eq!(pre.first(), Some(&root));
        assert_eq!(post.last(), Some(&root));
        assert_eq!(dom.walk_children(root, false).count(), 5);
        assert_eq!(dom.depth(), 7);
    }

    #[test]
    fn given_disposed_node_when_slot_reused_then_old_handle_stays_stale() {
        let mut dom = DomArena::new();
        let first = dom.insert_widget(dom.screen(), Widget::text("x")).unwrap();
        dom.detach_many(&[first]);
        dom.dispose(first);
        let second = dom.insert_widget(dom.screen(), Widget::text("y")).unwrap();

        assert!(!dom.contains(first));
        assert!(dom.contains(second));
        assert_ne!(first, second);
    }

    #[test]
    fn given_screen_blueprint_when_inserting_then_rejected_without_changes() {
        let mut dom = DomArena::new();
        let blueprint = Widget::container([Widget::text("a"), Widget::new(WidgetKind::Screen)]);

        let result = dom.insert_widget(dom.screen(), blueprint);

        assert_eq!(result.unwrap_err(), DomError::CannotMountScreen);
        assert_eq!(dom.len(), 1);
        assert!(dom.children(dom.screen()).is_empty());
    }

    #[test]
    fn given_very_deep_chain_when_measuring_depth_then_no_recursion_limit() {
        let mut dom = DomArena::new();
        let mut parent = dom.screen();
        for _ in 0..100_000 {
            parent = dom.insert_widget(parent, Widget::container(Vec::<Widget>::new())).unwrap();
        }

        assert_eq!(dom.depth(), 100_001);
        assert_eq!(dom.walk_postorder(dom.screen()).count(), 100_001);
    }

    #[test]
    fn given_deep_node_when_listing_ancestors_then_ends_at_screen() {
        let mut dom = DomArena::new();
        let root = dom.insert_widget(dom.screen(), branch(2)).unwrap();
        let leaf = dom.walk_children(root, false).last().unwrap();

        let ancestors: Vec<_> = dom.ancestors(leaf).collect();
        assert_eq!(ancestors.len(), 3);
        assert_eq!(ancestors.last(), Some(&dom.screen()));
        assert!(dom.is_ancestor_or_self(root, leaf));
        assert!(!dom.is_ancestor_or_self(leaf, root));
    }
}
