//! CSS-like selectors for querying the widget tree.
//!
//! Supported: `*`, `Type`, `#id`, `.class`, compounds (`Button#ok.primary`),
//! the descendant combinator (`Container Button`) and lists (`#a, #b`).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::arena::{DomArena, NodeData, NodeId};
use crate::domain::error::{DomError, DomResult};

static COMPOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>\*|[A-Za-z_][A-Za-z0-9_]*)?(?P<id>#[A-Za-z_][A-Za-z0-9_-]*)?(?P<classes>(?:\.[A-Za-z_][A-Za-z0-9_-]*)*)$",
    )
    .expect("compound selector regex is valid")
});

/// One compound selector: every present part must match the same node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub type_name: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    fn parse(source: &str, selector: &str) -> DomResult<Self> {
        let caps = COMPOUND_RE
            .captures(source)
            .ok_or_else(|| invalid(selector, format!("unexpected token '{}'", source)))?;

        let type_name = caps
            .name("type")
            .map(|m| m.as_str())
            .filter(|t| *t != "*")
            .map(str::to_string);
        let id = caps.name("id").map(|m| m.as_str()[1..].to_string());
        let classes = caps
            .name("classes")
            .map(|m| {
                m.as_str()
                    .split('.')
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            type_name,
            id,
            classes,
        })
    }

    pub fn matches(&self, data: &NodeData) -> bool {
        if let Some(type_name) = &self.type_name {
            if !data.kind.is_a(type_name) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if data.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| data.has_class(class))
    }
}

/// A chain of compounds joined by the descendant combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    /// Outermost first; the last compound selects the node itself.
    pub parts: Vec<Compound>,
}

impl Complex {
    fn matches(&self, dom: &DomArena, id: NodeId) -> bool {
        let Some((subject, ancestors_needed)) = self.parts.split_last() else {
            return false;
        };
        match dom.data(id) {
            Some(data) if subject.matches(data) => {}
            _ => return false,
        }

        // Greedy right-to-left: nearest ancestor satisfying each compound.
        let mut pending = ancestors_needed.iter().rev().peekable();
        for ancestor in dom.ancestors(id) {
            let Some(compound) = pending.peek() else {
                break;
            };
            if dom.data(ancestor).is_some_and(|data| compound.matches(data)) {
                pending.next();
            }
        }
        pending.peek().is_none()
    }
}

/// Parsed selector list; a node matches when any alternative matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> DomResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(invalid(source, "empty selector".to_string()));
        }

        let mut alternatives = Vec::new();
        for group in trimmed.split(',') {
            let group = group.trim();
            if group.is_empty() {
                return Err(invalid(source, "empty selector in list".to_string()));
            }
            let parts = group
                .split_whitespace()
                .map(|part| Compound::parse(part, source))
                .collect::<DomResult<Vec<_>>>()?;
            alternatives.push(Complex { parts });
        }

        Ok(Self {
            source: trimmed.to_string(),
            alternatives,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, dom: &DomArena, id: NodeId) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(dom, id))
    }

    /// All descendants of the screen matching this selector, in document order.
    pub fn select(&self, dom: &DomArena) -> Vec<NodeId> {
        dom.walk_children(dom.screen(), false)
            .filter(|&id| self.matches(dom, id))
            .collect()
    }

    /// The single matching node, or `AmbiguousQuery` for zero or several.
    pub fn select_one(&self, dom: &DomArena) -> DomResult<NodeId> {
        let matches = self.select(dom);
        match matches.as_slice() {
            [only] => Ok(*only),
            _ => Err(DomError::AmbiguousQuery {
                selector: self.source.clone(),
                matches: matches.len(),
            }),
        }
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn invalid(selector: &str, reason: String) -> DomError {
    DomError::InvalidSelector {
        selector: selector.to_string(),
        reason,
    }
}
