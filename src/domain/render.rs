//! Text rendering of the widget tree via `termtree`.

use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{DomArena, NodeId};

pub trait TreeRender {
    /// Renders the tree, marking `focused` with a trailing `*`.
    fn to_tree_string(&self, focused: Option<NodeId>) -> Tree<String>;

    /// The rendered tree as text.
    fn render_text(&self, focused: Option<NodeId>) -> String {
        let tree = self.to_tree_string(focused);
        let text = tree.to_string();
        release_tree(tree);
        text
    }
}

impl TreeRender for DomArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, focused: Option<NodeId>) -> Tree<String> {
        let label = |id: NodeId| {
            let text = self
                .data(id)
                .map(|data| data.to_string())
                .unwrap_or_else(|| id.to_string());
            if focused == Some(id) {
                format!("{} *", text)
            } else {
                text
            }
        };

        // Post-order: a node's subtrees are the last entries on the stack.
        let screen = self.screen();
        let mut built: Vec<Tree<String>> = Vec::new();
        for id in self.walk_postorder(screen) {
            let leaves = built.split_off(built.len() - self.children(id).len());
            built.push(Tree::new(label(id)).with_leaves(leaves));
        }
        built.pop().unwrap_or_else(|| Tree::new(label(screen)))
    }
}

/// Drops a tree level by level instead of recursively.
pub fn release_tree<D: Display>(tree: Tree<D>) {
    let mut pending = vec![tree];
    while let Some(mut node) = pending.pop() {
        pending.append(&mut node.leaves);
    }
}
