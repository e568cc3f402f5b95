use crate::application::app::App;
use crate::application::pending::Pending;
use crate::domain::{NodeId, RemovalReport, Selector};

/// Result of [`App::query`]: matching nodes in document order.
///
/// A snapshot; nodes removed afterwards stay in the list as stale handles.
#[derive(Debug, Clone)]
pub struct DomQuery {
    app: App,
    selector: Selector,
    nodes: Vec<NodeId>,
}

impl DomQuery {
    pub(crate) fn new(app: App, selector: Selector, nodes: Vec<NodeId>) -> Self {
        Self {
            app,
            selector,
            nodes,
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Removes every matched node (and its subtree) as one batch.
    pub fn remove(&self) -> Pending<RemovalReport> {
        self.app.remove(self.nodes.iter().copied())
    }
}

impl IntoIterator for DomQuery {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
