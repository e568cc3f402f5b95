//! Removal planning and application.
//!
//! A removal request may name overlapping nodes (an ancestor and some of its
//! descendants). Planning reduces the request to disjoint subtree roots so
//! that every node is detached and disposed exactly once.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::arena::{DomArena, NodeData, NodeId};
use crate::domain::error::{DomError, DomResult};

/// Validated removal: disjoint roots plus every node they cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalPlan {
    /// Requested nodes with no requested ancestor, in request order
    roots: Vec<NodeId>,
    /// Every node to dispose, post-order within each root
    doomed: Vec<NodeId>,
    /// Requested handles that no longer resolve
    stale: usize,
}

impl RemovalPlan {
    /// Builds a plan without touching the tree.
    ///
    /// Fails with `CannotRemoveScreen` if the screen is requested; stale
    /// handles are counted and otherwise ignored.
    #[instrument(level = "debug", skip(dom, requested), fields(requested = requested.len()))]
    pub fn new(dom: &DomArena, requested: &[NodeId]) -> DomResult<Self> {
        let mut stale = 0;
        let mut live = HashSet::with_capacity(requested.len());
        let mut ordered = Vec::with_capacity(requested.len());
        for &id in requested {
            if id == dom.screen() {
                return Err(DomError::CannotRemoveScreen);
            }
            if !dom.contains(id) {
                stale += 1;
                continue;
            }
            if live.insert(id) {
                ordered.push(id);
            }
        }

        let roots: Vec<NodeId> = ordered
            .into_iter()
            .filter(|&id| !dom.ancestors(id).any(|ancestor| live.contains(&ancestor)))
            .collect();
        let doomed: Vec<NodeId> = roots
            .iter()
            .flat_map(|&root| dom.walk_postorder(root))
            .collect();

        debug!(
            roots = roots.len(),
            doomed = doomed.len(),
            stale,
            "planned removal"
        );
        Ok(Self {
            roots,
            doomed,
            stale,
        })
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn doomed(&self) -> &[NodeId] {
        &self.doomed
    }

    pub fn doomed_set(&self) -> HashSet<NodeId> {
        self.doomed.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.doomed.is_empty()
    }

    /// Detaches every root and disposes every covered node.
    ///
    /// The plan must have been built against the current state of `dom`.
    #[instrument(level = "debug", skip(self, dom))]
    pub fn apply(self, dom: &mut DomArena) -> RemovalOutcome {
        dom.detach_many(&self.roots);
        let disposed: Vec<(NodeId, NodeData)> = self
            .doomed
            .iter()
            .filter_map(|&id| dom.dispose(id).map(|data| (id, data)))
            .collect();

        RemovalOutcome {
            report: RemovalReport {
                removed: disposed.iter().map(|(id, _)| *id).collect(),
                skipped: self.stale,
            },
            disposed,
        }
    }
}

/// What a completed removal did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Disposed nodes, children before parents
    pub removed: Vec<NodeId>,
    /// Requested handles that were already gone
    pub skipped: usize,
}

impl RemovalReport {
    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Report plus the data of every disposed node, for lifecycle notification.
#[derive(Debug)]
pub struct RemovalOutcome {
    pub report: RemovalReport,
    pub disposed: Vec<(NodeId, NodeData)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::selector::Selector;
    use crate::domain::widget::Widget;

    fn branch() -> Widget {
        (0..5).fold(Widget::text("leaf"), |inner, _| Widget::container([inner]))
    }

    fn two_branches() -> DomArena {
        let mut dom = DomArena::new();
        let screen = dom.screen();
        dom.insert_widget(screen, branch()).unwrap();
        dom.insert_widget(screen, Widget::text("middle")).unwrap();
        dom.insert_widget(screen, branch()).unwrap();
        dom
    }

    #[test]
    fn given_overlapping_request_when_planning_then_keeps_only_outermost_roots() {
        let dom = two_branches();
        let containers = Selector::parse("Container").unwrap().select(&dom);
        assert_eq!(containers.len(), 10);

        let plan = RemovalPlan::new(&dom, &containers).unwrap();
        let top = dom.children(dom.screen());
        assert_eq!(plan.roots(), &[top[0], top[2]]);
        assert_eq!(plan.doomed().len(), 12);
        assert_eq!(plan.doomed_set().len(), 12);
    }

    #[test]
    fn given_overlapping_request_when_applying_then_each_node_disposed_once() {
        let mut dom = two_branches();
        let mut requested = Selector::parse("Container").unwrap().select(&dom);
        requested.extend(Selector::parse("Static").unwrap().select(&dom).into_iter().take(1));
        requested.extend(requested.clone());

        let outcome = RemovalPlan::new(&dom, &requested).unwrap().apply(&mut dom);

        assert_eq!(outcome.report.removed.len(), 12);
        assert_eq!(outcome.report.skipped, 0);
        assert_eq!(dom.walk_children(dom.screen(), false).count(), 1);
    }

    #[test]
    fn given_screen_in_request_when_planning_then_fails_without_changes() {
        let dom = two_branches();
        let first = dom.children(dom.screen())[0];
        let result = RemovalPlan::new(&dom, &[first, dom.screen()]);
        assert_eq!(result.unwrap_err(), DomError::CannotRemoveScreen);
        assert_eq!(dom.len(), 14);
    }

    #[test]
    fn given_already_removed_node_when_removing_again_then_skips_it() {
        let mut dom = two_branches();
        let first = dom.children(dom.screen())[0];
        RemovalPlan::new(&dom, &[first]).unwrap().apply(&mut dom);

        let plan = RemovalPlan::new(&dom, &[first]).unwrap();
        assert!(plan.is_empty());
        let report = plan.apply(&mut dom).report;
        assert_eq!(report.skipped, 1);
        assert!(report.is_empty());
        assert_eq!(dom.walk_children(dom.screen(), false).count(), 7);
    }

    #[test]
    fn given_removed_middle_sibling_when_applying_then_sibling_order_preserved() {
        let mut dom = DomArena::new();
        let screen = dom.screen();
        for label in ["a", "b", "c", "d"] {
            dom.insert_widget(screen, Widget::text(label)).unwrap();
        }
        let b = dom.children(screen)[1];
        RemovalPlan::new(&dom, &[b]).unwrap().apply(&mut dom);

        let labels: Vec<_> = dom
            .children(screen)
            .iter()
            .filter_map(|&id| dom.data(id).and_then(|d| d.label.clone()))
            .collect();
        assert_eq!(labels, vec!["a", "c", "d"]);
    }
}
