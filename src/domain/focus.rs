//! Keyboard focus: the focus chain, tab navigation and re-targeting after
//! the focused node is removed.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::{DomArena, NodeId};
use crate::domain::error::{DomError, DomResult};

/// Where focus goes when the focused node is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusPolicy {
    /// Nearest surviving predecessor in the chain, else the last survivor
    #[default]
    Previous,
    /// Nearest surviving successor in the chain, else the first survivor
    Next,
}

impl fmt::Display for FocusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusPolicy::Previous => f.write_str("previous"),
            FocusPolicy::Next => f.write_str("next"),
        }
    }
}

/// A change of the focus pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub from: Option<NodeId>,
    pub to: Option<NodeId>,
}

/// Focusable nodes in tab order.
///
/// Pre-order over the screen; a disabled node hides its whole subtree.
pub fn focus_chain(dom: &DomArena) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut stack: Vec<NodeId> = dom.children(dom.screen()).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let Some(data) = dom.data(id) else {
            continue;
        };
        if data.disabled {
            continue;
        }
        if data.can_focus {
            chain.push(id);
        }
        stack.extend(dom.children(id).iter().rev());
    }
    chain
}

/// The focus pointer: `None` is the unfocused state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    focused: Option<NodeId>,
}

impl FocusState {
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn change_to(&mut self, to: Option<NodeId>) -> Option<FocusChange> {
        if self.focused == to {
            return None;
        }
        let change = FocusChange {
            from: self.focused,
            to,
        };
        self.focused = to;
        debug!(from = ?change.from, to = ?change.to, "focus changed");
        Some(change)
    }

    /// Focus `id` directly; it must be in the focus chain.
    pub fn set_focus(&mut self, dom: &DomArena, id: NodeId) -> DomResult<Option<FocusChange>> {
        if !dom.contains(id) {
            return Err(DomError::NodeNotFound(id));
        }
        if !focus_chain(dom).contains(&id) {
            return Err(DomError::NotFocusable(id));
        }
        Ok(self.change_to(Some(id)))
    }

    /// Tab: first node when unfocused, otherwise the next one, wrapping.
    #[instrument(level = "trace", skip(self, dom))]
    pub fn focus_next(&mut self, dom: &DomArena) -> Option<FocusChange> {
        let chain = focus_chain(dom);
        let target = match self.position_in(&chain) {
            Some(idx) => chain.get((idx + 1) % chain.len()).copied(),
            None => chain.first().copied(),
        };
        self.change_to(target.or(self.focused))
    }

    /// Shift+tab: last node when unfocused, otherwise the previous one, wrapping.
    #[instrument(level = "trace", skip(self, dom))]
    pub fn focus_previous(&mut self, dom: &DomArena) -> Option<FocusChange> {
        let chain = focus_chain(dom);
        let target = match self.position_in(&chain) {
            Some(idx) => chain.get((idx + chain.len() - 1) % chain.len()).copied(),
            None => chain.last().copied(),
        };
        self.change_to(target.or(self.focused))
    }

    /// Auto focus: pick the first focusable node if nothing is focused.
    pub fn focus_first_if_unfocused(&mut self, dom: &DomArena) -> Option<FocusChange> {
        if self.focused.is_some() {
            return None;
        }
        let first = focus_chain(dom).first().copied();
        self.change_to(first)
    }

    /// Re-targets focus after `doomed` nodes are removed.
    ///
    /// `chain_before` is the focus chain captured before removal. Focus only
    /// moves when the focused node itself is doomed.
    #[instrument(level = "debug", skip(self, chain_before, doomed))]
    pub fn resolve_after_removal(
        &mut self,
        chain_before: &[NodeId],
        doomed: &HashSet<NodeId>,
        policy: FocusPolicy,
    ) -> Option<FocusChange> {
        let focused = self.focused?;
        if !doomed.contains(&focused) {
            return None;
        }

        let survives = |id: &&NodeId| !doomed.contains(*id);
        let target = match chain_before.iter().position(|&id| id == focused) {
            Some(idx) => {
                let (before, rest) = chain_before.split_at(idx);
                let after = &rest[1..];
                match policy {
                    FocusPolicy::Previous => before
                        .iter()
                        .rev()
                        .find(survives)
                        .or_else(|| after.iter().rev().find(survives)),
                    FocusPolicy::Next => after
                        .iter()
                        .find(survives)
                        .or_else(|| before.iter().find(survives)),
                }
            }
            // Focused node was not in the chain (disabled after focusing).
            None => match policy {
                FocusPolicy::Previous => chain_before.iter().rev().find(survives),
                FocusPolicy::Next => chain_before.iter().find(survives),
            },
        };
        self.change_to(target.copied())
    }

    fn position_in(&self, chain: &[NodeId]) -> Option<usize> {
        let focused = self.focused?;
        chain.iter().position(|&id| id == focused)
    }
}
